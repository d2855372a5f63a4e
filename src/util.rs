//! Utility functions shared by the CLI-backed collaborators

/// Condense CLI output to its last non-empty lines for error messages
///
/// External tools print long transcripts; the useful failure reason is
/// almost always at the end. Returns up to `max_lines` trailing non-empty
/// lines joined with `"; "`.
pub(crate) fn output_tail(bytes: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut tail: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .rev()
        .take(max_lines)
        .collect();
    tail.reverse();

    if tail.is_empty() {
        "no output".to_string()
    } else {
        tail.join("; ")
    }
}
