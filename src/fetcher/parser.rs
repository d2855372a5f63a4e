//! Parser for the fetch tool's machine-readable progress stream
//!
//! The fetcher runs yt-dlp with a fixed `--progress-template` so that each
//! progress update arrives as one easily split line instead of a terminal
//! progress bar. Fields the tool cannot fill are printed as the literal
//! `NA`.

use crate::progress::FetchProgress;

/// Prefix our progress template puts on every progress line
pub(crate) const PROGRESS_PREFIX: &str = "progress ";

/// The template handed to `--progress-template`
///
/// Expands to `progress <downloaded> <total> <estimate> <status>`.
pub(crate) const PROGRESS_TEMPLATE: &str = "download:progress %(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s %(progress.status)s";

/// Parse one numeric field, treating `NA` and garbage as absent
///
/// The tool prints byte counts as integers or floats depending on the
/// extractor, so both are accepted.
fn parse_bytes(field: &str) -> Option<u64> {
    field.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u64)
}

/// Parse one stdout line into a progress sample
///
/// Returns `None` for anything that is not a progress line (tool chatter,
/// the final artifact path, partial writes).
pub(crate) fn parse_progress_line(line: &str) -> Option<FetchProgress> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    if fields.len() != 4 {
        return None;
    }

    if fields[3] == "finished" {
        return Some(FetchProgress::Finished);
    }

    let downloaded = parse_bytes(fields[0])?;
    // Mirror the tool's own display logic: exact total when known,
    // otherwise its estimate, otherwise unknown.
    let total = parse_bytes(fields[1]).or_else(|| parse_bytes(fields[2]));

    Some(FetchProgress::Bytes { downloaded, total })
}
