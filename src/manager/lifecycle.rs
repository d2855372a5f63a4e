//! Enqueue, query, retrieve and shutdown coordination.

use crate::error::{Error, JobError, Result};
use crate::types::{Event, FormatSelection, JobId, JobRecord, JobStatusInfo, Status};
use std::sync::atomic::Ordering;

use super::MediaDownloader;
use super::probe::validate_url;

impl MediaDownloader {
    /// Enqueue a fetch-and-transcode job
    ///
    /// Creates the job record in the `queued` state, hands execution to a
    /// background task, and returns the job id immediately. The caller
    /// never waits on the fetch; progress is observed through [`Self::query`]
    /// or the event stream.
    ///
    /// Once enqueued, a job runs to a terminal state: there is no
    /// cancellation and no timeout for a stuck transfer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] after [`Self::shutdown`] has begun,
    /// or an invalid-URL extraction error for malformed input. Admission
    /// itself cannot fail.
    pub async fn enqueue(&self, url: &str, selection: FormatSelection) -> Result<JobId> {
        if !self.job_state.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }
        validate_url(url)?;

        let id = JobId::new();
        let record = JobRecord::new(id, url.to_string(), selection.clone());
        self.store.put(record).await;

        self.emit_event(Event::Queued {
            id,
            url: url.to_string(),
        });
        tracing::info!(job_id = %id, url, audio_only = selection.audio_only, "job enqueued");

        let downloader = self.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            downloader.run_job(id, url, selection).await;
        });

        Ok(id)
    }

    /// Get a status snapshot of one job
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] for unknown or cleaned-up ids.
    pub async fn query(&self, id: JobId) -> Result<JobStatusInfo> {
        let record = self.store.get(id).await?;
        Ok(JobStatusInfo::from(&record))
    }

    /// Snapshot all tracked jobs, newest first
    pub async fn list(&self) -> Vec<JobStatusInfo> {
        self.store
            .list()
            .await
            .iter()
            .map(JobStatusInfo::from)
            .collect()
    }

    /// Open a completed job's artifact for delivery
    ///
    /// The returned [`Artifact`] holds an open file handle plus a
    /// [`CleanupTicket`]; when the ticket drops — after the artifact has
    /// been fully streamed, or the receiving client went away mid-stream —
    /// the job's working directory and record are removed. This is the only
    /// path that cleans up a *successful* job: a completed job that is
    /// never retrieved keeps its directory until external housekeeping
    /// reclaims it.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] for unknown ids,
    /// [`JobError::NotReady`] unless the job is completed, or
    /// [`Error::Io`] when the artifact cannot be opened.
    pub async fn retrieve(&self, id: JobId) -> Result<Artifact> {
        let record = self.store.get(id).await?;
        if record.status != Status::Completed {
            return Err(JobError::NotReady {
                id,
                status: record.status,
            }
            .into());
        }

        let path = record.artifact_path.ok_or_else(|| {
            // Guarded by the store invariant; reaching this means a writer
            // other than the runner touched the record.
            Error::Other(format!("completed job {id} has no artifact path"))
        })?;
        let filename = record.artifact_name.unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "artifact".to_string())
        });

        let file = tokio::fs::File::open(&path).await?;
        let len = file.metadata().await?.len();

        tracing::info!(job_id = %id, filename, len, "artifact handed to caller");

        Ok(Artifact {
            file,
            filename,
            len,
            cleanup: CleanupTicket {
                downloader: self.clone(),
                id,
            },
        })
    }

    /// Gracefully shut down the manager
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new jobs (enqueue returns `ShuttingDown`)
    /// 2. Waits for in-flight jobs up to the configured grace period —
    ///    transfers cannot be cancelled, so this bound is what keeps a
    ///    stuck fetch from hanging process exit
    /// 3. Emits [`Event::Shutdown`] to all subscribers
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.job_state
            .accepting_new
            .store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new jobs");

        let permits =
            u32::try_from(self.config.download.max_concurrent_jobs).unwrap_or(u32::MAX);
        let grace = self.config.download.shutdown_grace;
        match tokio::time::timeout(
            grace,
            self.job_state.concurrent_limit.acquire_many(permits),
        )
        .await
        {
            Ok(Ok(_all_slots)) => {
                tracing::info!("All active jobs completed gracefully");
            }
            Ok(Err(_closed)) => {
                // The semaphore is never closed; nothing to do but proceed.
            }
            Err(_) => {
                tracing::warn!("Timeout waiting for jobs to complete, proceeding with shutdown");
            }
        }

        self.emit_event(Event::Shutdown);
        tracing::info!("Shutdown complete");
        Ok(())
    }
}

/// A completed job's artifact, opened for delivery
///
/// Holds the open file, its metadata, and the cleanup ticket. Callers
/// stream the file however they like and simply drop the struct (or the
/// ticket, if taken apart) when done.
pub struct Artifact {
    /// Open handle to the artifact file
    pub file: tokio::fs::File,

    /// Base file name for the receiving client
    pub filename: String,

    /// File length in bytes
    pub len: u64,

    /// Deferred-cleanup guard; dropping it schedules removal of the job's
    /// directory and record
    pub cleanup: CleanupTicket,
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("filename", &self.filename)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Drop guard that schedules cleanup of one job
///
/// Created only by [`MediaDownloader::retrieve`]. Keep it alive exactly as
/// long as the artifact is being delivered.
pub struct CleanupTicket {
    downloader: MediaDownloader,
    id: JobId,
}

impl Drop for CleanupTicket {
    fn drop(&mut self) {
        let downloader = self.downloader.clone();
        let id = self.id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    downloader.cleanup_job(id).await;
                });
            }
            Err(_) => {
                tracing::warn!(job_id = %id, "no runtime at ticket drop; cleanup skipped");
            }
        }
    }
}
