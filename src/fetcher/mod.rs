//! Media fetching and transcoding
//!
//! The fetcher performs the actual network transfer and optional
//! transcoding for one job, emitting progress samples through a sink while
//! it runs. Implementations can shell out to an external binary or write
//! canned artifacts in tests.

mod cli;
pub(crate) mod parser;

pub use cli::YtDlpFetcher;

use crate::error::Result;
use crate::progress::ProgressSink;
use async_trait::async_trait;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Output file name template understood by the fetch tool
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Post-extraction audio transcode settings for audio-only jobs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioPostProcess {
    /// Target codec (e.g. "mp3")
    pub codec: String,
    /// Target quality, passed through to the transcoder (e.g. "192K")
    pub quality: String,
}

/// Everything the fetcher needs to execute one transfer
///
/// Built by the job runner from the job's selection and the library
/// configuration; the fetcher treats it as read-only.
#[derive(Clone, Debug)]
pub struct FetchPlan {
    /// The job's exclusive working directory; all output lands here
    pub output_dir: PathBuf,

    /// File name template within `output_dir`
    pub output_template: String,

    /// Format expression selecting the streams to download
    pub format_expression: String,

    /// Audio transcode to run after extraction (audio-only jobs)
    pub audio_postprocess: Option<AudioPostProcess>,

    /// Container to merge separate video+audio streams into
    pub merge_container: Option<String>,

    /// User-Agent override for outbound requests
    pub user_agent: Option<String>,

    /// Netscape-format cookie file
    pub cookie_file: Option<PathBuf>,

    /// Local address to bind outbound connections to
    pub source_address: Option<IpAddr>,
}

/// What a completed fetch produced
#[derive(Clone, Debug, Default)]
pub struct FetchOutcome {
    /// The path the tool reported writing, when it said so explicitly
    ///
    /// `None` means the caller must fall back to scanning the working
    /// directory.
    pub artifact: Option<PathBuf>,
}

/// Trait for performing the network transfer and transcode of one job
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Execute the transfer described by `plan`
    ///
    /// Progress samples are delivered through `progress` while the transfer
    /// runs; the sink swallows its own failures, so emitting is always safe.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::FetchError`] wrapped in
    /// [`crate::error::Error::Fetch`] on network, format, or transcode
    /// problems. Callers inside the job runner convert these into the
    /// job's terminal failed state.
    async fn fetch(
        &self,
        url: &str,
        plan: &FetchPlan,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<FetchOutcome>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
