//! Media metadata extraction
//!
//! The extractor resolves a URL into metadata and a curated list of
//! available encodings. Implementations can shell out to an external
//! binary or serve canned responses in tests.

mod cli;
pub(crate) mod parser;

pub use cli::YtDlpExtractor;

use crate::error::Result;
use crate::types::MediaInfo;
use async_trait::async_trait;

/// Trait for probing a URL for metadata and available formats
///
/// # Examples
///
/// ```no_run
/// use media_dl::extractor::{MediaExtractor, YtDlpExtractor};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = YtDlpExtractor::from_path().expect("yt-dlp not found");
/// let info = extractor.probe("https://example.com/watch?v=abc").await?;
/// println!("{}: {} formats", info.title, info.formats.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Resolve a URL into metadata and available encodings
    ///
    /// # Errors
    ///
    /// Returns an [`crate::error::ExtractionError`] wrapped in
    /// [`crate::error::Error::Extraction`] when the URL is unsupported, the
    /// site blocks the request, or the extractor tool cannot run.
    async fn probe(&self, url: &str) -> Result<MediaInfo>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
