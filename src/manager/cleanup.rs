//! Deferred removal of working directories and job records.
//!
//! All directory/record removal lives here so both triggers — successful
//! retrieval and fetch failure — share one idempotent implementation.

use crate::types::{Event, JobId};
use std::path::Path;

use super::MediaDownloader;

impl MediaDownloader {
    /// Remove a job's working directory and its store record
    ///
    /// Best-effort and idempotent: a missing directory or record is not an
    /// error, and a directory that cannot be removed (e.g. a file still
    /// locked) only produces a warning. The directory goes first, then the
    /// record, so a surviving record can still explain a leftover
    /// directory.
    pub(crate) async fn cleanup_job(&self, id: JobId) {
        let workdir = self.config.job_dir(id);
        self.remove_workdir(id, &workdir).await;

        if self.store.remove(id).await {
            tracing::info!(job_id = %id, "job record removed");
            self.emit_event(Event::CleanedUp { id });
        }
    }

    /// Best-effort recursive removal of one working directory
    pub(crate) async fn remove_workdir(&self, id: JobId, dir: &Path) {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => {
                tracing::debug!(job_id = %id, dir = %dir.display(), "working directory removed");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    job_id = %id,
                    dir = %dir.display(),
                    error = %e,
                    "failed to remove working directory"
                );
            }
        }
    }
}
