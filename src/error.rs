//! Error types for media-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Extraction, Fetch, Job, Config)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use crate::types::{JobId, Status};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "tools.ytdlp_path")
        key: Option<String>,
    },

    /// Probing a URL for metadata/formats failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Fetch/transcode error (only ever observed inside the job runner)
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Job lifecycle contract violation (unknown id, artifact not ready)
    #[error("job error: {0}")]
    Job(#[from] JobError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress - not accepting new jobs
    #[error("shutdown in progress: not accepting new jobs")]
    ShuttingDown,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors from probing a URL for metadata and available formats
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The submitted string is not a well-formed URL
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The string that failed to parse as a URL
        url: String,
    },

    /// The extractor tool could not be launched
    #[error("failed to launch extractor: {reason}")]
    ToolLaunch {
        /// Why the process could not be spawned
        reason: String,
    },

    /// The extractor ran but reported failure (unsupported site, blocked
    /// request, removed media)
    #[error("probe failed: {detail}")]
    ProbeFailed {
        /// Trailing extractor output explaining the failure
        detail: String,
    },

    /// The extractor produced output that could not be parsed
    #[error("malformed extractor output: {detail}")]
    Malformed {
        /// What was wrong with the output
        detail: String,
    },
}

/// Errors from the fetch/transcode phase
///
/// These are caught entirely inside the job runner and converted into the
/// job's terminal `failed` state; they never propagate to API callers.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetch tool could not be launched
    #[error("failed to launch fetcher: {reason}")]
    ToolLaunch {
        /// Why the process could not be spawned
        reason: String,
    },

    /// The fetch tool exited unsuccessfully (network failure, missing
    /// format, transcode failure)
    #[error("fetch failed{}: {detail}", code.map(|c| format!(" (exit code {c})")).unwrap_or_default())]
    ToolFailed {
        /// Process exit code, if the process exited normally
        code: Option<i32>,
        /// Trailing fetcher output explaining the failure
        detail: String,
    },

    /// The fetch reported success but no artifact was found on disk
    #[error("no artifact found in {dir}")]
    NoArtifact {
        /// The working directory that was scanned
        dir: PathBuf,
    },

    /// The fetch task died without producing a result
    #[error("fetch aborted: {reason}")]
    Aborted {
        /// Why the task died (panic message or cancellation)
        reason: String,
    },
}

/// Job lifecycle contract violations
#[derive(Debug, Error)]
pub enum JobError {
    /// No job with this identifier exists (never created, or cleaned up)
    #[error("job {id} not found")]
    NotFound {
        /// The job ID that was not found
        id: JobId,
    },

    /// Retrieval attempted before the job completed
    #[error("job {id} is not ready for retrieval (status: {status})")]
    NotReady {
        /// The job ID whose artifact was requested
        id: JobId,
        /// The job's current status
        status: Status,
    },
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
/// It follows a standard format with machine-readable error codes,
/// human-readable messages, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "job_not_found",
///     "message": "job 0b0c…41 not found",
///     "details": {
///       "job_id": "0b0c…41"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "job_not_found", "invalid_url")
    ///
    /// Clients can use this for programmatic error handling.
    pub code: String,

    /// Human-readable error message
    ///
    /// This is suitable for displaying to end users.
    pub message: String,

    /// Optional additional context about the error
    ///
    /// This can include fields like job_id, current status, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Extraction(ExtractionError::InvalidUrl { .. }) => 400,

            // 422 Unprocessable Entity - the URL parsed but probing it failed
            Error::Extraction(ExtractionError::ProbeFailed { .. }) => 422,
            Error::Extraction(ExtractionError::Malformed { .. }) => 422,

            // 503 Service Unavailable - extractor binary missing/unlaunchable
            Error::Extraction(ExtractionError::ToolLaunch { .. }) => 503,

            // 404 Not Found
            Error::Job(JobError::NotFound { .. }) => 404,

            // 409 Conflict - job exists but is in the wrong state
            Error::Job(JobError::NotReady { .. }) => 409,

            // 502 Bad Gateway - upstream transfer problems
            Error::Fetch(FetchError::ToolFailed { .. }) => 502,

            // 503 Service Unavailable
            Error::Fetch(FetchError::ToolLaunch { .. }) => 503,
            Error::ShuttingDown => 503,

            // 500 Internal Server Error - Server-side issues
            Error::Fetch(FetchError::NoArtifact { .. }) => 500,
            Error::Fetch(FetchError::Aborted { .. }) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Extraction(e) => match e {
                ExtractionError::InvalidUrl { .. } => "invalid_url",
                ExtractionError::ToolLaunch { .. } => "extractor_unavailable",
                ExtractionError::ProbeFailed { .. } => "probe_failed",
                ExtractionError::Malformed { .. } => "malformed_probe_output",
            },
            Error::Fetch(e) => match e {
                FetchError::ToolLaunch { .. } => "fetcher_unavailable",
                FetchError::ToolFailed { .. } => "fetch_failed",
                FetchError::NoArtifact { .. } => "no_artifact",
                FetchError::Aborted { .. } => "fetch_aborted",
            },
            Error::Job(e) => match e {
                JobError::NotFound { .. } => "job_not_found",
                JobError::NotReady { .. } => "job_not_ready",
            },
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        // Add contextual details for specific error types
        let details = match &error {
            Error::Job(JobError::NotFound { id }) => Some(serde_json::json!({
                "job_id": id,
            })),
            Error::Job(JobError::NotReady { id, status }) => Some(serde_json::json!({
                "job_id": id,
                "status": status,
            })),
            Error::Extraction(ExtractionError::InvalidUrl { url }) => Some(serde_json::json!({
                "url": url,
            })),
            Error::Fetch(FetchError::NoArtifact { dir }) => Some(serde_json::json!({
                "dir": dir,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
