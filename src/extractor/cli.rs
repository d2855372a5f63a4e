//! CLI-based extractor using the external yt-dlp binary

use super::MediaExtractor;
use super::parser::parse_probe_output;
use crate::error::{ExtractionError, Result};
use crate::types::MediaInfo;
use crate::util::output_tail;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Lines of tool output kept when building a failure message
const ERROR_TAIL_LINES: usize = 3;

/// Extractor that executes `yt-dlp --dump-single-json` to probe a URL
///
/// # Examples
///
/// ```no_run
/// use media_dl::extractor::{MediaExtractor, YtDlpExtractor};
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let extractor = YtDlpExtractor::new(PathBuf::from("/usr/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let extractor = YtDlpExtractor::from_path().expect("yt-dlp not found in PATH");
///
/// let info = extractor.probe("https://example.com/watch?v=abc").await?;
/// # Ok(())
/// # }
/// ```
pub struct YtDlpExtractor {
    binary_path: PathBuf,
}

impl YtDlpExtractor {
    /// Create a new extractor with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// # Returns
    ///
    /// `Some(YtDlpExtractor)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn probe(&self, url: &str) -> Result<MediaInfo> {
        let output = Command::new(&self.binary_path)
            .arg("--dump-single-json")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--quiet")
            .arg("--")
            .arg(url)
            .output()
            .await
            .map_err(|e| ExtractionError::ToolLaunch {
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ExtractionError::ProbeFailed {
                detail: output_tail(&output.stderr, ERROR_TAIL_LINES),
            }
            .into());
        }

        let info = parse_probe_output(&output.stdout)?;
        tracing::debug!(
            url,
            title = %info.title,
            formats = info.formats.len(),
            "probe succeeded"
        );
        Ok(info)
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
