//! Job store: the single source of truth for job state
//!
//! The store is an injectable abstraction so the in-memory implementation
//! used here can be swapped for a shared/distributed backend without
//! touching the orchestrator.

use crate::error::{JobError, Result};
use crate::types::{JobId, JobRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A closure applied to a record under the store's write lock
pub type MutateFn = Box<dyn FnOnce(&mut JobRecord) + Send>;

/// Concurrency-safe mapping from job identifier to job record
///
/// All operations are safe under concurrent access from the job runner
/// (writer) and any number of status-query callers (readers), with
/// read-after-write visibility: a state written by the runner is observed
/// by readers no earlier than it is written.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a record, keyed by its id
    ///
    /// An existing record under the same id is replaced; ids are minted
    /// per-enqueue so this only happens if a caller reuses a record.
    async fn put(&self, record: JobRecord);

    /// Fetch a snapshot of a record
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] for unknown or removed identifiers.
    async fn get(&self, id: JobId) -> Result<JobRecord>;

    /// Apply an atomic read-modify-write to a record
    ///
    /// The closure runs under the write lock, so concurrent readers observe
    /// either the old or the new record, never a torn intermediate.
    /// Returns a snapshot of the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] for unknown or removed identifiers.
    async fn mutate(&self, id: JobId, apply: MutateFn) -> Result<JobRecord>;

    /// Remove a record, returning whether it existed
    async fn remove(&self, id: JobId) -> bool;

    /// Snapshot all records, newest first
    async fn list(&self) -> Vec<JobRecord>;
}

/// In-memory [`JobStore`] backed by a guarded hash map
///
/// Readers share the lock; writers serialize. Nothing is persisted —
/// records live exactly as long as the process.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl MemoryJobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn put(&self, record: JobRecord) {
        self.jobs.write().await.insert(record.id, record);
    }

    async fn get(&self, id: JobId) -> Result<JobRecord> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| JobError::NotFound { id }.into())
    }

    async fn mutate(&self, id: JobId, apply: MutateFn) -> Result<JobRecord> {
        let mut jobs = self.jobs.write().await;
        let record = jobs
            .get_mut(&id)
            .ok_or(JobError::NotFound { id })?;
        apply(record);
        Ok(record.clone())
    }

    async fn remove(&self, id: JobId) -> bool {
        self.jobs.write().await.remove(&id).is_some()
    }

    async fn list(&self) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = self.jobs.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}
