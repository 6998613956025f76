// HTTP endpoint that streams generated ideas as server-sent events

pub mod upstream;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::models::ServeConfig;
use upstream::ChatClient;

const DEFAULT_TOPIC: &str = "AI in DevOps";

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] anyhow::Error),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "idea stream failed to start");
        match self {
            Self::Upstream(_) => StatusCode::BAD_GATEWAY.into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdeaParams {
    topic: Option<String>,
}

pub fn router(chat: ChatClient) -> Router {
    Router::new()
        .route("/api", get(ideas))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(chat)
}

/// Bind the configured address and serve until the process is stopped.
pub async fn run(config: &ServeConfig) -> Result<()> {
    let chat = ChatClient::from_config(config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    tracing::info!(addr = %config.bind, model = %config.model, "idea endpoint listening");
    axum::serve(listener, router(chat))
        .await
        .context("Server failed")?;

    Ok(())
}

/// GET /api: stream idea text for the requested topic.
///
/// Fragments keep their embedded newlines; the SSE layer splits them across
/// `data:` fields and clients join them back together. If the upstream
/// breaks mid-transfer the response simply ends, leaving the client with
/// whatever text had already been sent.
async fn ideas(
    State(chat): State<ChatClient>,
    Query(params): Query<IdeaParams>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>, ServeError> {
    let topic = params.topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string());
    tracing::info!(%topic, "starting idea stream");

    let deltas = chat.stream_completion(&prompt_for_topic(&topic)).await?;

    let stream = deltas
        .take_while(|item| {
            if let Err(e) = item {
                tracing::warn!(error = %e, "idea stream broke mid-transfer");
            }
            futures::future::ready(item.is_ok())
        })
        .filter_map(|item| async move {
            item.ok()
                .map(|text| Ok(Event::default().data(sanitize(&text))))
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

fn prompt_for_topic(topic: &str) -> String {
    format!(
        "Generate a list of engaging tech talk topic ideas for a technical summit about: {topic}\n\n\
         For each topic idea, include:\n\
         - A catchy title\n\
         - A brief description (2-3 sentences)\n\
         - Key takeaways for the audience\n\n\
         Format with headings, sub-headings and bullet points. Provide 5-7 topic ideas."
    )
}

/// Carriage returns are not allowed in SSE data fields; strip them so CRLF
/// output from the model degrades to plain newlines.
fn sanitize(text: &str) -> String {
    text.replace('\r', "")
}
