//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] — Probing, job submission, status and artifact retrieval
//! - [`system`] — Health, events, OpenAPI, shutdown

use serde::{Deserialize, Serialize};

mod jobs;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use jobs::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /probe
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProbeRequest {
    /// The media URL to inspect
    pub url: String,
}

/// Request body for POST /jobs
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct EnqueueRequest {
    /// The media URL to fetch
    pub url: String,

    /// Extractor-assigned format id, or the sentinel "best"
    pub format_id: String,

    /// Discard video and transcode to the configured audio codec (default: false)
    #[serde(default)]
    pub audio_only: bool,
}

/// Response body for POST /jobs
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct EnqueueResponse {
    /// Identifier to poll and retrieve with
    pub job_id: crate::types::JobId,
}
