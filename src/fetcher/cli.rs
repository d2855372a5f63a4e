//! CLI-based fetcher using the external yt-dlp binary

use super::parser::{PROGRESS_TEMPLATE, parse_progress_line};
use super::{FetchOutcome, FetchPlan, MediaFetcher};
use crate::error::{FetchError, Result};
use crate::progress::ProgressSink;
use crate::util::output_tail;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Lines of tool output kept when building a failure message
const ERROR_TAIL_LINES: usize = 5;

/// Fetcher that executes yt-dlp as a subprocess
///
/// Progress is streamed through a machine-readable `--progress-template`
/// and the final artifact path is captured from
/// `--print after_move:filepath`, the tool's explicit "what was written"
/// signal.
pub struct YtDlpFetcher {
    binary_path: PathBuf,
}

impl YtDlpFetcher {
    /// Create a new fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// # Returns
    ///
    /// `Some(YtDlpFetcher)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }
}

/// Build the full argument vector for one fetch invocation
///
/// Kept as a pure function so the translation from a [`FetchPlan`] to tool
/// flags is testable without spawning anything.
pub(crate) fn build_args(url: &str, plan: &FetchPlan) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    let mut output_path = plan.output_dir.clone();
    output_path.push(&plan.output_template);
    args.push("--output".into());
    args.push(output_path.into_os_string());

    args.push("--format".into());
    args.push(plan.format_expression.clone().into());

    if let Some(audio) = &plan.audio_postprocess {
        args.push("--extract-audio".into());
        args.push("--audio-format".into());
        args.push(audio.codec.clone().into());
        args.push("--audio-quality".into());
        args.push(audio.quality.clone().into());
    }

    if let Some(container) = &plan.merge_container {
        args.push("--merge-output-format".into());
        args.push(container.clone().into());
    }

    if let Some(user_agent) = &plan.user_agent {
        args.push("--user-agent".into());
        args.push(user_agent.clone().into());
    }

    if let Some(cookie_file) = &plan.cookie_file {
        args.push("--cookies".into());
        args.push(cookie_file.clone().into_os_string());
    }

    if let Some(addr) = &plan.source_address {
        args.push("--source-address".into());
        args.push(addr.to_string().into());
    }

    args.push("--no-playlist".into());
    args.push("--no-warnings".into());
    args.push("--quiet".into());
    args.push("--newline".into());
    args.push("--progress".into());
    args.push("--progress-template".into());
    args.push(PROGRESS_TEMPLATE.into());
    args.push("--print".into());
    args.push("after_move:filepath".into());

    args.push("--".into());
    args.push(url.into());

    args
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        url: &str,
        plan: &FetchPlan,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<FetchOutcome> {
        let args = build_args(url, plan);

        let mut child = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FetchError::ToolLaunch {
                reason: e.to_string(),
            })?;

        // Drain stderr concurrently so a chatty tool cannot deadlock on a
        // full pipe while we read stdout.
        let mut stderr_buf = Vec::new();
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                stderr.read_to_end(&mut buf).await.ok();
                buf
            })
        });

        let mut artifact: Option<PathBuf> = None;
        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(sample) = parse_progress_line(&line) {
                    progress.observe(sample).await;
                } else if !line.trim().is_empty() {
                    // The only non-progress stdout is --print output: the
                    // final path of whatever was written last.
                    artifact = Some(PathBuf::from(line.trim()));
                }
            }
        }

        let status = child.wait().await.map_err(|e| FetchError::Aborted {
            reason: e.to_string(),
        })?;

        if let Some(task) = stderr_task
            && let Ok(buf) = task.await
        {
            stderr_buf = buf;
        }

        if !status.success() {
            return Err(FetchError::ToolFailed {
                code: status.code(),
                detail: output_tail(&stderr_buf, ERROR_TAIL_LINES),
            }
            .into());
        }

        tracing::debug!(url, artifact = ?artifact, "fetch tool exited successfully");
        Ok(FetchOutcome { artifact })
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
