//! Health, events, OpenAPI and shutdown handlers.

use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Sse, sse::Event as SseEvent},
};
use serde_json::json;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3.1 specification document")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use utoipa::OpenApi;
    Json(crate::api::ApiDoc::openapi())
}

/// GET /events - Server-sent events stream of job lifecycle events
#[utoipa::path(
    get,
    path = "/events",
    tag = "system",
    responses(
        (status = 200, description = "SSE stream; one event per job state change", content_type = "text/event-stream")
    )
)]
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = state.downloader.subscribe();
    let stream = BroadcastStream::new(receiver);

    let sse_stream = stream.filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json_data) => {
                let event_type = match &event {
                    crate::types::Event::Queued { .. } => "queued",
                    crate::types::Event::Processing { .. } => "processing",
                    crate::types::Event::Progress { .. } => "progress",
                    crate::types::Event::Completed { .. } => "completed",
                    crate::types::Event::Failed { .. } => "failed",
                    crate::types::Event::CleanedUp { .. } => "cleaned_up",
                    crate::types::Event::Shutdown => "shutdown",
                };

                Some(Ok(SseEvent::default().event(event_type).data(json_data)))
            }
            Err(e) => {
                tracing::warn!("Failed to serialize event to JSON: {}", e);
                None
            }
        },
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("SSE client lagged, skipped {} events", skipped);
            Some(Ok(SseEvent::default().event("error").data(format!(
                r#"{{"error":"lagged","skipped":{}}}"#,
                skipped
            ))))
        }
    });

    Sse::new(sse_stream).keep_alive(axum::response::sse::KeepAlive::default())
}

/// POST /shutdown - Graceful shutdown
///
/// Stops accepting new jobs and waits (in the background) for in-flight
/// jobs up to the configured grace period.
#[utoipa::path(
    post,
    path = "/shutdown",
    tag = "system",
    responses(
        (status = 202, description = "Shutdown initiated")
    )
)]
pub async fn shutdown(State(state): State<AppState>) -> impl IntoResponse {
    let downloader = state.downloader.clone();
    tokio::spawn(async move {
        if let Err(e) = downloader.shutdown().await {
            tracing::error!(error = %e, "graceful shutdown failed");
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({"status": "shutting down"})),
    )
}
