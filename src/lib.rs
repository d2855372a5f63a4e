//! # media-dl
//!
//! Embeddable backend library for media download applications: submit a
//! URL, inspect the available encodings, enqueue an asynchronous
//! fetch-and-transcode job, poll its progress, and stream the finished
//! artifact — with automatic disk cleanup afterward.
//!
//! ## Design Philosophy
//!
//! media-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Non-blocking** - Enqueue returns immediately; jobs run on their own
//!   tasks behind a bounded worker pool
//! - **Pluggable** - The job store and both external collaborators
//!   (extractor, fetcher) sit behind traits and can be swapped
//! - **Observable** - Consumers subscribe to lifecycle events or poll job
//!   state; an optional REST API exposes both over HTTP
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, FormatSelection, MediaDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MediaDownloader::new(Config::default()).await?;
//!
//!     // Inspect what's available
//!     let info = downloader.probe("https://example.com/watch?v=abc").await?;
//!     println!("{}: {} formats", info.title, info.formats.len());
//!
//!     // Enqueue and poll
//!     let id = downloader
//!         .enqueue(
//!             "https://example.com/watch?v=abc",
//!             FormatSelection { format_id: "best".into(), audio_only: false },
//!         )
//!         .await?;
//!     let status = downloader.query(id).await?;
//!     println!("job {id}: {:?} ({:.0}%)", status.status, status.progress);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Media metadata extraction
pub mod extractor;
/// Media fetching and transcoding
pub mod fetcher;
/// Core job manager (decomposed into focused submodules)
pub mod manager;
/// Progress reporting for the active fetch phase
pub mod progress;
/// Job store abstraction and in-memory implementation
pub mod store;
/// Core types and events
pub mod types;

mod util;

// Re-export commonly used types
pub use config::{ApiConfig, Config, DownloadConfig, NetworkConfig, ToolsConfig};
pub use error::{
    ApiError, Error, ErrorDetail, ExtractionError, FetchError, JobError, Result, ToHttpStatus,
};
pub use extractor::{MediaExtractor, YtDlpExtractor};
pub use fetcher::{AudioPostProcess, FetchOutcome, FetchPlan, MediaFetcher, YtDlpFetcher};
pub use manager::{Artifact, CleanupTicket, MediaDownloader};
pub use progress::{FetchProgress, ProgressSink};
pub use store::{JobStore, MemoryJobStore};
pub use types::{
    Event, FormatInfo, FormatSelection, JobId, JobRecord, JobStatusInfo, MediaInfo, Status,
};

/// Helper function to run the manager with graceful signal handling.
///
/// Waits for a termination signal and then calls the manager's
/// `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, MediaDownloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = MediaDownloader::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: MediaDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
