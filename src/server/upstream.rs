// Upstream OpenAI-compatible chat client

use anyhow::{Context, Result};
use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use crate::api::sse::SseDecoder;
use crate::models::ServeConfig;

const DONE_SENTINEL: &str = "[DONE]";

/// Client for the OpenAI-compatible chat completions API that backs idea
/// generation.
#[derive(Debug, Clone)]
pub struct ChatClient {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    /// Build a client from serve settings, reading the API key from the
    /// environment variable the config names.
    pub fn from_config(config: &ServeConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).with_context(|| {
            format!(
                "Missing API key: set the {} environment variable",
                config.api_key_env
            )
        })?;

        Self::new(
            config.upstream_base_url.clone(),
            config.model.clone(),
            api_key,
            config.request_timeout,
        )
    }

    pub fn new(
        base_url: String,
        model: String,
        api_key: String,
        request_timeout: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            client,
        })
    }

    /// Stream assistant text deltas for a prompt until the model is done.
    pub async fn stream_completion(
        &self,
        prompt: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String>> + Send>>> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send chat completion request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Upstream request failed with status {status}: {text}");
        }

        let stream = futures::stream::unfold(
            (
                response.bytes_stream(),
                SseDecoder::new(),
                VecDeque::<String>::new(),
            ),
            |(mut byte_stream, mut decoder, mut pending)| async move {
                loop {
                    if let Some(payload) = pending.pop_front() {
                        if payload == DONE_SENTINEL {
                            return None;
                        }
                        match parse_delta(&payload) {
                            Ok(Some(text)) => {
                                return Some((Ok(text), (byte_stream, decoder, pending)));
                            }
                            Ok(None) => continue,
                            Err(e) => return Some((Err(e), (byte_stream, decoder, pending))),
                        }
                    }

                    match byte_stream.next().await {
                        Some(Ok(bytes)) => {
                            pending.extend(decoder.feed(&bytes));
                        }
                        Some(Err(e)) => {
                            return Some((
                                Err(anyhow::anyhow!("Stream error: {e}")),
                                (byte_stream, decoder, pending),
                            ));
                        }
                        None => return None,
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}

/// Extract the text delta from one stream chunk, if it carries any.
/// Role-only and empty deltas come back as `None`.
fn parse_delta(payload: &str) -> Result<Option<String>> {
    let chunk = serde_json::from_str::<ChatChunk>(payload)
        .context("Failed to parse upstream stream chunk")?;

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> ChatClient {
        ChatClient::new(base_url, "deepseek-chat".to_string(), "test-key".to_string(), 5).unwrap()
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = ServeConfig {
            api_key_env: "TALKGEN_TEST_KEY_THAT_DOES_NOT_EXIST".to_string(),
            ..ServeConfig::default()
        };
        std::env::remove_var(&config.api_key_env);

        let result = ChatClient::from_config(&config);
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("TALKGEN_TEST_KEY_THAT_DOES_NOT_EXIST"));
    }

    #[test]
    fn test_from_config_reads_configured_env() {
        let config = ServeConfig {
            api_key_env: "TALKGEN_TEST_KEY_PRESENT".to_string(),
            ..ServeConfig::default()
        };
        std::env::set_var(&config.api_key_env, "sk-test");

        assert!(ChatClient::from_config(&config).is_ok());
        std::env::remove_var(&config.api_key_env);
    }

    #[test]
    fn test_trailing_slash_trimmed_from_base_url() {
        let client = test_client("http://example.test/v1/".to_string());
        assert_eq!(client.base_url, "http://example.test/v1");
    }

    #[test]
    fn test_parse_delta_variants() {
        let content = r#"{"choices":[{"delta":{"content":"Hi"}}]}"#;
        assert_eq!(parse_delta(content).unwrap(), Some("Hi".to_string()));

        let role_only = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_delta(role_only).unwrap(), None);

        let empty = r#"{"choices":[{"delta":{"content":""}}]}"#;
        assert_eq!(parse_delta(empty).unwrap(), None);

        let no_choices = r#"{"choices":[]}"#;
        assert_eq!(parse_delta(no_choices).unwrap(), None);

        assert!(parse_delta("not json").is_err());
    }

    #[tokio::test]
    async fn test_streams_deltas_until_done() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"## Idea\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" 1\\n\"}}]}\n\n",
            "data: [DONE]\n\n",
        );

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "stream": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let mut stream = client.stream_completion("prompt").await.unwrap();

        let mut deltas = Vec::new();
        while let Some(item) = stream.next().await {
            deltas.push(item.unwrap());
        }
        assert_eq!(deltas, vec!["## Idea", " 1\n"]);
    }

    #[tokio::test]
    async fn test_prompt_sent_as_user_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "tell me things"}],
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("data: [DONE]\n\n", "text/event-stream"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let mut stream = client.stream_completion("tell me things").await.unwrap();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let result = client.stream_completion("prompt").await;

        assert!(result.is_err());
        let message = format!("{:#}", result.err().unwrap());
        assert!(message.contains("401"), "unexpected error: {message}");
    }
}
