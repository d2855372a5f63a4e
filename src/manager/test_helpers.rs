//! Shared test helpers: mock collaborators and manager construction.

use crate::config::Config;
use crate::error::{ExtractionError, FetchError, Result};
use crate::extractor::MediaExtractor;
use crate::fetcher::{FetchOutcome, FetchPlan, MediaFetcher};
use crate::manager::MediaDownloader;
use crate::progress::{FetchProgress, ProgressSink};
use crate::store::MemoryJobStore;
use crate::types::{FormatInfo, FormatSelection, JobId, JobStatusInfo, MediaInfo};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

/// URL accepted by the mocks in every test
pub(crate) const TEST_URL: &str = "https://example.com/watch?v=abc";

/// A plausible probe result for the static extractor
pub(crate) fn sample_media_info() -> MediaInfo {
    MediaInfo {
        title: "Test Video".to_string(),
        thumbnail: Some("https://i.example.com/t.jpg".to_string()),
        duration_seconds: Some(212.0),
        uploader: Some("Example Channel".to_string()),
        formats: vec![
            FormatInfo {
                format_id: "137".to_string(),
                ext: "mp4".to_string(),
                resolution: Some("1080p".to_string()),
                audio_bitrate_kbps: None,
                filesize_bytes: 55_000_000,
                has_video: true,
                has_audio: false,
            },
            FormatInfo {
                format_id: "18".to_string(),
                ext: "mp4".to_string(),
                resolution: Some("360p".to_string()),
                audio_bitrate_kbps: Some(96.0),
                filesize_bytes: 9_000_000,
                has_video: true,
                has_audio: true,
            },
        ],
    }
}

/// Extractor that returns a canned response without any subprocess
pub(crate) struct StaticExtractor {
    pub(crate) response: std::result::Result<MediaInfo, String>,
}

impl StaticExtractor {
    pub(crate) fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            response: Ok(sample_media_info()),
        })
    }

    pub(crate) fn failing(detail: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(detail.to_string()),
        })
    }
}

#[async_trait]
impl MediaExtractor for StaticExtractor {
    async fn probe(&self, _url: &str) -> Result<MediaInfo> {
        match &self.response {
            Ok(info) => Ok(info.clone()),
            Err(detail) => Err(ExtractionError::ProbeFailed {
                detail: detail.clone(),
            }
            .into()),
        }
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// What the mock fetcher does after playing its progress script
pub(crate) enum FetchBehavior {
    /// Write `filename` into the plan's output dir and succeed
    WriteFile {
        filename: String,
        report_descriptor: bool,
    },
    /// Succeed without writing anything or reporting a descriptor
    WriteNothing,
    /// Fail with a fetch error carrying `message`
    Fail { message: String },
    /// Panic inside the fetch task
    Panic,
    /// Wait for the gate, then write `filename` and succeed
    Block { gate: Arc<Notify>, filename: String },
}

/// Scriptable in-process fetcher; records every plan it receives
pub(crate) struct MockFetcher {
    pub(crate) behavior: FetchBehavior,
    pub(crate) progress_script: Vec<FetchProgress>,
    pub(crate) seen: Mutex<Vec<(String, FetchPlan)>>,
}

impl MockFetcher {
    pub(crate) fn new(behavior: FetchBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            progress_script: Vec::new(),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn succeeding(filename: &str) -> Arc<Self> {
        Self::new(FetchBehavior::WriteFile {
            filename: filename.to_string(),
            report_descriptor: true,
        })
    }

    pub(crate) fn with_progress(behavior: FetchBehavior, script: Vec<FetchProgress>) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            progress_script: script,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// The URL and plan of the most recent fetch
    pub(crate) async fn last_plan(&self) -> (String, FetchPlan) {
        self.seen
            .lock()
            .await
            .last()
            .cloned()
            .expect("no fetch was recorded")
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn fetch(
        &self,
        url: &str,
        plan: &FetchPlan,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<FetchOutcome> {
        self.seen.lock().await.push((url.to_string(), plan.clone()));

        for sample in &self.progress_script {
            progress.observe(*sample).await;
        }

        match &self.behavior {
            FetchBehavior::WriteFile {
                filename,
                report_descriptor,
            } => {
                let path = plan.output_dir.join(filename);
                tokio::fs::write(&path, b"artifact bytes")
                    .await
                    .expect("mock artifact write");
                Ok(FetchOutcome {
                    artifact: (*report_descriptor).then(|| path),
                })
            }
            FetchBehavior::WriteNothing => Ok(FetchOutcome::default()),
            FetchBehavior::Fail { message } => Err(FetchError::ToolFailed {
                code: Some(1),
                detail: message.clone(),
            }
            .into()),
            FetchBehavior::Panic => panic!("mock fetcher exploded"),
            FetchBehavior::Block { gate, filename } => {
                gate.notified().await;
                let path = plan.output_dir.join(filename);
                tokio::fs::write(&path, b"artifact bytes")
                    .await
                    .expect("mock artifact write");
                Ok(FetchOutcome {
                    artifact: Some(path),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// A config rooted inside a test's temp directory
pub(crate) fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.download.download_root = root.join("downloads");
    config.download.max_concurrent_jobs = 3;
    config.download.shutdown_grace = Duration::from_secs(1);
    config
}

/// Build a manager around the given fetcher and a static extractor
pub(crate) async fn downloader_with_config(
    config: Config,
    fetcher: Arc<MockFetcher>,
) -> MediaDownloader {
    MediaDownloader::with_collaborators(
        config,
        Arc::new(MemoryJobStore::new()),
        StaticExtractor::succeeding(),
        fetcher,
    )
    .await
    .expect("test downloader construction")
}

/// Helper to create a test MediaDownloader with a succeeding mock fetcher.
/// Returns the downloader, the fetcher and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader()
-> (MediaDownloader, Arc<MockFetcher>, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let fetcher = MockFetcher::succeeding("Test Video.mp4");
    let downloader = downloader_with_config(test_config(temp_dir.path()), fetcher.clone()).await;
    (downloader, fetcher, temp_dir)
}

/// Default video selection used by most tests
pub(crate) fn best_video() -> FormatSelection {
    FormatSelection {
        format_id: "best".to_string(),
        audio_only: false,
    }
}

/// Poll until the job reaches a terminal state
pub(crate) async fn wait_for_terminal(downloader: &MediaDownloader, id: JobId) -> JobStatusInfo {
    for _ in 0..500 {
        let info = downloader
            .query(id)
            .await
            .expect("job vanished before reaching a terminal state");
        if info.status.is_terminal() {
            return info;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {id} did not reach a terminal state in time");
}

/// Poll until `check` returns true or the deadline passes
pub(crate) async fn wait_until<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..500 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}
