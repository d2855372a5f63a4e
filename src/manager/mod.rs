//! Core job manager split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`probe`] - URL probing through the extractor collaborator
//! - [`lifecycle`] - Enqueue, query, retrieve and shutdown
//! - [`runner`] - End-to-end execution of one job
//! - [`cleanup`] - Deferred removal of working directories and records

mod cleanup;
mod lifecycle;
mod probe;
mod runner;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use lifecycle::{Artifact, CleanupTicket};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extractor::{MediaExtractor, YtDlpExtractor};
use crate::fetcher::{MediaFetcher, YtDlpFetcher};
use crate::store::{JobStore, MemoryJobStore};
use crate::types::Event;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::{Semaphore, broadcast};

/// Worker-slot and admission state shared across jobs
#[derive(Clone)]
pub(crate) struct JobState {
    /// Semaphore bounding concurrent fetches (respects max_concurrent_jobs config)
    pub(crate) concurrent_limit: Arc<Semaphore>,
    /// Flag to indicate whether new jobs are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

/// Main job manager instance (cloneable - all fields are Arc-wrapped)
///
/// Owns the job store, the collaborator handles, and the worker pool state.
/// Every public operation is safe to call concurrently from any number of
/// tasks.
#[derive(Clone)]
pub struct MediaDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Single source of truth for job state
    pub(crate) store: Arc<dyn JobStore>,
    /// Metadata/format probing collaborator
    pub(crate) extractor: Arc<dyn MediaExtractor>,
    /// Transfer/transcode collaborator
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Worker-slot and admission state
    pub(crate) job_state: JobState,
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance
    ///
    /// This initializes all core components:
    /// - Creates the download root directory
    /// - Resolves the yt-dlp binary (explicit path or PATH discovery)
    /// - Sets up the in-memory job store and event broadcast channel
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no usable yt-dlp binary can be
    /// resolved, or [`Error::Io`] when the download root cannot be created.
    pub async fn new(config: Config) -> Result<Self> {
        let binary = resolve_binary(&config)?;
        tracing::info!(binary = %binary.display(), "resolved fetch tool");

        let extractor: Arc<dyn MediaExtractor> = Arc::new(YtDlpExtractor::new(binary.clone()));
        let fetcher: Arc<dyn MediaFetcher> = Arc::new(YtDlpFetcher::new(binary));
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());

        Self::with_collaborators(config, store, extractor, fetcher).await
    }

    /// Create an instance with injected collaborators
    ///
    /// This is the seam for swapping the store backend or the extractor/
    /// fetcher implementations (e.g. mocks in tests, a different transfer
    /// tool in production).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the download root cannot be created.
    pub async fn with_collaborators(
        config: Config,
        store: Arc<dyn JobStore>,
        extractor: Arc<dyn MediaExtractor>,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(&config.download.download_root)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download root '{}': {}",
                        config.download.download_root.display(),
                        e
                    ),
                ))
            })?;

        // Buffer size 1000: subscribers falling further behind see Lagged
        let (event_tx, _rx) = broadcast::channel(1000);

        let concurrent_limit = Arc::new(Semaphore::new(config.download.max_concurrent_jobs));

        Ok(Self {
            config: Arc::new(config),
            store,
            extractor,
            fetcher,
            event_tx,
            job_state: JobState {
                concurrent_limit,
                accepting_new: Arc::new(AtomicBool::new(true)),
            },
        })
    }

    /// Subscribe to job lifecycle events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all
    /// events independently. Events are buffered, but if a subscriber falls
    /// behind by more than 1000 events, it will receive a
    /// `RecvError::Lagged` error.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    ///
    /// The configuration is wrapped in an Arc, so this is a cheap clone
    /// operation.
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped
    /// (ok() converts Err to None). Job state never depends on delivery.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server runs concurrently with job processing and listens on the
    /// configured bind address (default: 127.0.0.1:8750).
    pub fn spawn_api_server(
        self: &Arc<Self>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}

/// Resolve the yt-dlp binary from config or PATH
fn resolve_binary(config: &Config) -> Result<PathBuf> {
    if let Some(path) = &config.tools.ytdlp_path {
        return Ok(path.clone());
    }

    if config.tools.search_path {
        return which::which("yt-dlp").map_err(|e| Error::Config {
            message: format!("yt-dlp not found in PATH: {e}"),
            key: Some("tools.ytdlp_path".to_string()),
        });
    }

    Err(Error::Config {
        message: "no yt-dlp path configured and PATH discovery is disabled".to_string(),
        key: Some("tools.ytdlp_path".to_string()),
    })
}
