// Idea stream API client

pub mod sse;

use anyhow::{Context, Result};
use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use sse::SseDecoder;
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct IdeaClient {
    base_url: String,
    client: Client,
}

impl IdeaClient {
    pub fn new(base_url: String, request_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    #[allow(dead_code)]
    pub fn with_default_url() -> Result<Self> {
        Self::new("http://127.0.0.1:8000".to_string(), 600)
    }

    /// Stream idea text fragments for a topic, in arrival order.
    ///
    /// The topic is sent exactly as given; any trimming or validation is the
    /// caller's concern. The stream ends when the endpoint closes the
    /// response, and yields an `Err` item if the transport fails mid-stream.
    pub async fn stream_ideas(
        &self,
        topic: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String>> + Send>>> {
        let url = format!("{}/api", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("topic", topic)])
            .send()
            .await
            .context("Failed to send idea request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Idea request failed with status {status}: {text}");
        }

        let stream = futures::stream::unfold(
            (response.bytes_stream(), SseDecoder::new(), VecDeque::new()),
            |(mut byte_stream, mut decoder, mut pending)| async move {
                loop {
                    if let Some(fragment) = pending.pop_front() {
                        return Some((Ok(fragment), (byte_stream, decoder, pending)));
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

    #[allow(dead_code)]
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/healthz", self.base_url);

        Ok(self
            .client
            .get(&url)
            .send()
            .await
            .is_ok_and(|response| response.status().is_success()))
    }
}
