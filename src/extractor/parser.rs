//! Parser for the extractor tool's JSON probe output

use crate::error::ExtractionError;
use crate::types::{FormatInfo, MediaInfo};
use serde::Deserialize;

/// Container extensions offered to clients; other containers are hidden
/// from the curated list to keep the choice meaningful.
const LISTED_EXTENSIONS: [&str; 2] = ["mp4", "webm"];

/// Top-level shape of `yt-dlp --dump-single-json` output
///
/// Only the fields the library consumes are modeled; everything else in the
/// dump is ignored.
#[derive(Debug, Deserialize)]
struct RawProbe {
    title: Option<String>,
    thumbnail: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

/// One entry of the raw format list
#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    ext: Option<String>,
    height: Option<u32>,
    vcodec: Option<String>,
    acodec: Option<String>,
    abr: Option<f64>,
    filesize: Option<u64>,
    filesize_approx: Option<f64>,
}

impl RawFormat {
    fn has_video(&self) -> bool {
        self.vcodec.as_deref().is_some_and(|c| c != "none")
    }

    fn has_audio(&self) -> bool {
        self.acodec.as_deref().is_some_and(|c| c != "none")
    }

    fn approx_size(&self) -> u64 {
        self.filesize
            .or_else(|| self.filesize_approx.map(|s| s as u64))
            .unwrap_or(0)
    }
}

/// Parse the JSON dump produced by a probe invocation
///
/// # Errors
///
/// Returns [`ExtractionError::Malformed`] when the output is not valid JSON
/// of the expected shape.
pub(crate) fn parse_probe_output(stdout: &[u8]) -> Result<MediaInfo, ExtractionError> {
    let raw: RawProbe =
        serde_json::from_slice(stdout).map_err(|e| ExtractionError::Malformed {
            detail: e.to_string(),
        })?;

    Ok(MediaInfo {
        title: raw.title.unwrap_or_else(|| "untitled".to_string()),
        thumbnail: raw.thumbnail,
        duration_seconds: raw.duration,
        uploader: raw.uploader,
        formats: curate_formats(&raw.formats),
    })
}

/// Reduce the raw format list to one selectable entry per video resolution
///
/// Keeps video formats with a known height in a listed container, one per
/// resolution, sorted highest resolution first. The raw list often carries
/// dozens of near-duplicate encodings; clients pick by resolution.
fn curate_formats(raw: &[RawFormat]) -> Vec<FormatInfo> {
    let mut curated: Vec<(u32, FormatInfo)> = Vec::new();

    for format in raw {
        let Some(height) = format.height else {
            continue;
        };
        if !format.has_video() {
            continue;
        }
        let Some(ext) = format.ext.as_deref() else {
            continue;
        };
        if !LISTED_EXTENSIONS.contains(&ext) {
            continue;
        }
        if curated.iter().any(|(h, _)| *h == height) {
            continue;
        }

        curated.push((
            height,
            FormatInfo {
                format_id: format.format_id.clone(),
                ext: ext.to_string(),
                resolution: Some(format!("{height}p")),
                audio_bitrate_kbps: format.abr.map(|a| a as f32),
                filesize_bytes: format.approx_size(),
                has_video: true,
                has_audio: format.has_audio(),
            },
        ));
    }

    curated.sort_by(|(a, _), (b, _)| b.cmp(a));
    curated.into_iter().map(|(_, f)| f).collect()
}
