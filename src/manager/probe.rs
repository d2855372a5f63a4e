//! URL probing through the extractor collaborator.

use crate::error::{ExtractionError, Result};
use crate::types::MediaInfo;

use super::MediaDownloader;

impl MediaDownloader {
    /// Probe a URL for metadata and available encodings
    ///
    /// This is a synchronous passthrough (no job is created): the caller
    /// waits for the extractor and receives its result or failure directly.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Extraction`] when the URL is
    /// malformed, the site is unsupported, or the extractor cannot run.
    pub async fn probe(&self, url: &str) -> Result<MediaInfo> {
        validate_url(url)?;
        self.extractor.probe(url).await
    }
}

/// Reject strings that are not plain http(s) URLs before handing them to a
/// subprocess
pub(crate) fn validate_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).map_err(|_| ExtractionError::InvalidUrl {
        url: url.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ExtractionError::InvalidUrl {
            url: url.to_string(),
        }
        .into());
    }

    Ok(())
}
