//! Progress reporting for the active fetch phase
//!
//! The fetcher collaborator emits raw byte-count samples; the reporter
//! derives a monotonic percentage on the job record. 100 is reserved for
//! the completed transition written by the job runner, so everything the
//! reporter writes is capped at 99.

use crate::store::JobStore;
use crate::types::{Event, JobId};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Ceiling for fetch-phase progress; only the completed transition writes 100.
const FETCH_PHASE_CAP: f32 = 99.0;

/// One progress sample from the fetch collaborator
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FetchProgress {
    /// Bytes transferred so far, with the expected total when known
    Bytes {
        /// Bytes downloaded so far
        downloaded: u64,
        /// Expected total bytes (None when the server does not say)
        total: Option<u64>,
    },

    /// Raw transfer finished; merging/transcoding may still be running
    Finished,
}

/// Sink for progress samples emitted during a fetch
///
/// Implementations must never propagate failures back into the fetch
/// collaborator; a sample that cannot be applied is simply dropped.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Handle one sample
    async fn observe(&self, sample: FetchProgress);
}

/// [`ProgressSink`] that projects samples onto a job record
///
/// Derived percentages never decrease and never reach 100: a sample with an
/// unknown total leaves progress unchanged, and the `Finished` signal clamps
/// to 99 because the fetcher may still be merging or transcoding after raw
/// transfer ends.
pub struct ProgressReporter {
    store: Arc<dyn JobStore>,
    id: JobId,
    event_tx: broadcast::Sender<Event>,
}

impl ProgressReporter {
    /// Create a reporter bound to one job
    pub fn new(store: Arc<dyn JobStore>, id: JobId, event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            store,
            id,
            event_tx,
        }
    }

    /// Percentage for a byte sample, or None when the total is unknown
    fn percent_of(sample: FetchProgress) -> Option<f32> {
        match sample {
            FetchProgress::Bytes {
                downloaded,
                total: Some(total),
            } if total > 0 => {
                let pct = (downloaded as f64 / total as f64 * 100.0) as f32;
                Some(pct.min(FETCH_PHASE_CAP))
            }
            FetchProgress::Bytes { .. } => None,
            FetchProgress::Finished => Some(FETCH_PHASE_CAP),
        }
    }
}

#[async_trait]
impl ProgressSink for ProgressReporter {
    async fn observe(&self, sample: FetchProgress) {
        let Some(pct) = Self::percent_of(sample) else {
            // Unknown total: keep the last value rather than regress
            return;
        };

        let result = self
            .store
            .mutate(
                self.id,
                Box::new(move |record| {
                    record.progress = record.progress.max(pct);
                }),
            )
            .await;

        match result {
            Ok(record) => {
                self.event_tx
                    .send(Event::Progress {
                        id: self.id,
                        percent: record.progress,
                    })
                    .ok();
            }
            Err(e) => {
                // The record can vanish mid-fetch (e.g. cleaned up); the
                // fetch collaborator must never see that.
                tracing::debug!(job_id = %self.id, error = %e, "dropping progress sample");
            }
        }
    }
}
