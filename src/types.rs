//! Core types for media-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Unique identifier for a job
///
/// Wraps a UUIDv4 so identifiers are opaque, collision-free tokens for the
/// process lifetime. Unlike database rowids, ids are minted by the library
/// itself at enqueue time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub uuid::Uuid);

impl JobId {
    /// Mint a fresh random job identifier
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Get the inner UUID value
    pub fn get(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<uuid::Uuid> for JobId {
    fn from(id: uuid::Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Job status
///
/// Transitions are monotonic along `Queued → Processing → {Completed | Failed}`;
/// both `Completed` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Queued and waiting for a worker slot
    Queued,
    /// Fetch/transcode in progress
    Processing,
    /// Artifact ready for retrieval
    Completed,
    /// Failed with an error message
    Failed,
}

impl Status {
    /// Whether this status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Queued => "queued",
            Status::Processing => "processing",
            Status::Completed => "completed",
            Status::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// What the client asked to be fetched
///
/// Immutable after enqueue. `format_id` may be the sentinel `"best"`, which
/// requests best-available video+audio rather than a specific encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormatSelection {
    /// Extractor-assigned format identifier, or the sentinel `"best"`
    pub format_id: String,

    /// Discard video and transcode to the configured audio codec
    #[serde(default)]
    pub audio_only: bool,
}

impl FormatSelection {
    /// The sentinel format id meaning "best available video+audio"
    pub const BEST: &'static str = "best";

    /// Whether this selection uses the best-available sentinel
    pub fn is_best(&self) -> bool {
        self.format_id == Self::BEST
    }
}

/// A job tracked by the store, from enqueue to cleanup
///
/// Only the job runner executing this job writes `status`, `progress`,
/// `artifact_path` and `error`; every other actor is a reader.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique job identifier
    pub id: JobId,

    /// Current status
    pub status: Status,

    /// Progress percentage (0.0 to 100.0); exactly 100 only when completed
    pub progress: f32,

    /// Originally requested URL (immutable after creation)
    pub source_url: String,

    /// Requested format and audio flag (immutable after creation)
    pub selection: FormatSelection,

    /// Path of the finished artifact; present iff status is Completed
    pub artifact_path: Option<PathBuf>,

    /// Base file name of the finished artifact; present iff status is Completed
    pub artifact_name: Option<String>,

    /// Failure description; present iff status is Failed
    pub error: Option<String>,

    /// When the job was enqueued
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a fresh record in the Queued state
    pub fn new(id: JobId, source_url: String, selection: FormatSelection) -> Self {
        Self {
            id,
            status: Status::Queued,
            progress: 0.0,
            source_url,
            selection,
            artifact_path: None,
            artifact_name: None,
            error: None,
            created_at: Utc::now(),
        }
    }
}

/// Status snapshot returned to pollers
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JobStatusInfo {
    /// Unique job identifier
    pub id: JobId,

    /// Current status
    pub status: Status,

    /// Progress percentage (0.0 to 100.0)
    pub progress: f32,

    /// Originally requested URL
    pub source_url: String,

    /// Failure description (failed jobs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the job was enqueued
    pub created_at: DateTime<Utc>,
}

impl From<&JobRecord> for JobStatusInfo {
    fn from(record: &JobRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            progress: record.progress,
            source_url: record.source_url.clone(),
            error: record.error.clone(),
            created_at: record.created_at,
        }
    }
}

/// One available encoding reported by the extractor
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FormatInfo {
    /// Extractor-assigned format identifier
    pub format_id: String,

    /// Container extension (e.g. "mp4", "webm")
    pub ext: String,

    /// Vertical resolution label for video formats (e.g. "1080p")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    /// Average audio bitrate in kbps for audio formats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bitrate_kbps: Option<f32>,

    /// Approximate size in bytes (0 when the extractor cannot estimate)
    pub filesize_bytes: u64,

    /// Whether the format carries a video stream
    pub has_video: bool,

    /// Whether the format carries an audio stream
    pub has_audio: bool,
}

/// Metadata and available encodings for a probed URL
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaInfo {
    /// Media title
    pub title: String,

    /// Thumbnail URL, if the site provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Duration in seconds, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,

    /// Uploader or channel name, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,

    /// Curated list of selectable encodings, highest resolution first
    pub formats: Vec<FormatInfo>,
}

/// Event emitted during the job lifecycle
///
/// Best-effort observability stream; dropped events never affect job state.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Job added to the store
    Queued {
        /// Job ID
        id: JobId,
        /// Requested URL
        url: String,
    },

    /// Job picked up by a worker slot
    Processing {
        /// Job ID
        id: JobId,
    },

    /// Progress update during the fetch phase
    Progress {
        /// Job ID
        id: JobId,
        /// Progress percentage (0.0 to 100.0)
        percent: f32,
    },

    /// Job finished and its artifact is ready
    Completed {
        /// Job ID
        id: JobId,
        /// Base name of the artifact
        filename: String,
    },

    /// Job reached the failed state
    Failed {
        /// Job ID
        id: JobId,
        /// Failure description
        error: String,
    },

    /// Working directory and record removed
    CleanedUp {
        /// Job ID
        id: JobId,
    },

    /// Graceful shutdown initiated
    Shutdown,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // --- JobId ---

    #[test]
    fn job_id_round_trips_through_display_and_from_str() {
        let id = JobId::new();
        let parsed = JobId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id, "Display output must parse back to the same id");
    }

    #[test]
    fn job_id_from_str_rejects_non_uuid() {
        assert!(
            JobId::from_str("not-a-uuid").is_err(),
            "arbitrary strings must not parse as JobId"
        );
        assert!(JobId::from_str("").is_err(), "empty string must not parse");
    }

    #[test]
    fn job_id_new_is_unique() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b, "two minted ids must differ");
    }

    #[test]
    fn job_id_serializes_as_bare_string() {
        let id = JobId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(
            json,
            format!("\"{id}\""),
            "serde(transparent) should produce a bare UUID string, not an object"
        );
    }

    // --- Status ---

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Queued).unwrap(), "\"queued\"");
        assert_eq!(
            serde_json::to_string(&Status::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&Status::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(serde_json::to_string(&Status::Failed).unwrap(), "\"failed\"");
    }

    #[test]
    fn status_terminal_flags() {
        assert!(!Status::Queued.is_terminal());
        assert!(!Status::Processing.is_terminal());
        assert!(Status::Completed.is_terminal());
        assert!(Status::Failed.is_terminal());
    }

    #[test]
    fn status_display_matches_serde_names() {
        for status in [
            Status::Queued,
            Status::Processing,
            Status::Completed,
            Status::Failed,
        ] {
            let display = status.to_string();
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(
                json,
                format!("\"{display}\""),
                "Display and serde must agree so log lines match API payloads"
            );
        }
    }

    // --- FormatSelection ---

    #[test]
    fn selection_best_sentinel_detection() {
        let best = FormatSelection {
            format_id: "best".to_string(),
            audio_only: false,
        };
        assert!(best.is_best());

        let specific = FormatSelection {
            format_id: "137".to_string(),
            audio_only: false,
        };
        assert!(!specific.is_best());
    }

    #[test]
    fn selection_audio_only_defaults_to_false() {
        let parsed: FormatSelection = serde_json::from_str(r#"{"format_id":"22"}"#).unwrap();
        assert!(
            !parsed.audio_only,
            "audio_only must default to false when omitted"
        );
    }

    // --- JobRecord ---

    #[test]
    fn new_record_starts_queued_with_no_terminal_fields() {
        let record = JobRecord::new(
            JobId::new(),
            "https://example.com/watch?v=abc".to_string(),
            FormatSelection {
                format_id: "best".to_string(),
                audio_only: false,
            },
        );

        assert_eq!(record.status, Status::Queued);
        assert_eq!(record.progress, 0.0);
        assert!(record.artifact_path.is_none(), "no artifact before completion");
        assert!(record.artifact_name.is_none());
        assert!(record.error.is_none(), "no error before failure");
    }

    #[test]
    fn status_info_omits_error_when_absent() {
        let record = JobRecord::new(
            JobId::new(),
            "https://example.com/v".to_string(),
            FormatSelection {
                format_id: "best".to_string(),
                audio_only: false,
            },
        );

        let info = JobStatusInfo::from(&record);
        let json = serde_json::to_value(&info).unwrap();
        assert!(
            json.get("error").is_none(),
            "error field should be omitted from JSON when None"
        );
    }

    #[test]
    fn status_info_carries_error_for_failed_record() {
        let mut record = JobRecord::new(
            JobId::new(),
            "https://example.com/v".to_string(),
            FormatSelection {
                format_id: "22".to_string(),
                audio_only: false,
            },
        );
        record.status = Status::Failed;
        record.error = Some("network unreachable".to_string());

        let info = JobStatusInfo::from(&record);
        assert_eq!(info.status, Status::Failed);
        assert_eq!(info.error.as_deref(), Some("network unreachable"));
    }

    // --- Event ---

    #[test]
    fn events_tag_with_snake_case_type() {
        let event = Event::Progress {
            id: JobId::new(),
            percent: 42.5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percent"], 42.5);

        let json = serde_json::to_value(&Event::Shutdown).unwrap();
        assert_eq!(json["type"], "shutdown");
    }
}
