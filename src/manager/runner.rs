//! End-to-end execution of one job.

use crate::error::{Error, FetchError, Result};
use crate::fetcher::{AudioPostProcess, FetchPlan, OUTPUT_TEMPLATE};
use crate::progress::ProgressReporter;
use crate::types::{Event, FormatSelection, JobId, Status};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::MediaDownloader;

impl MediaDownloader {
    /// Run one job to a terminal state
    ///
    /// Invoked on its own task by [`MediaDownloader::enqueue`]; nothing
    /// awaits it and no error leaves it. Every failure along the way is
    /// converted into the job's terminal `failed` state, after which the
    /// working directory is removed best-effort.
    pub(crate) async fn run_job(&self, id: JobId, url: String, selection: FormatSelection) {
        // Bounded worker pool: the job stays `queued` until a slot frees up
        let _permit = match self
            .job_state
            .concurrent_limit
            .clone()
            .acquire_owned()
            .await
        {
            Ok(permit) => permit,
            Err(_closed) => return,
        };

        let workdir = self.config.job_dir(id);

        match self.execute(id, &url, &selection, &workdir).await {
            Ok((artifact_path, artifact_name)) => {
                let path_for_record = artifact_path.clone();
                let name_for_record = artifact_name.clone();
                let updated = self
                    .store
                    .mutate(
                        id,
                        Box::new(move |record| {
                            record.artifact_path = Some(path_for_record);
                            record.artifact_name = Some(name_for_record);
                            record.status = Status::Completed;
                            record.progress = 100.0;
                        }),
                    )
                    .await;

                match updated {
                    Ok(_) => {
                        tracing::info!(job_id = %id, artifact = %artifact_path.display(), "job completed");
                        self.emit_event(Event::Completed {
                            id,
                            filename: artifact_name,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(job_id = %id, error = %e, "record vanished before completion");
                    }
                }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(job_id = %id, error = %message, "job failed");

                let message_for_record = message.clone();
                let updated = self
                    .store
                    .mutate(
                        id,
                        Box::new(move |record| {
                            record.status = Status::Failed;
                            record.error = Some(message_for_record);
                        }),
                    )
                    .await;
                if let Err(store_err) = updated {
                    tracing::warn!(job_id = %id, error = %store_err, "record vanished before failure");
                }

                self.emit_event(Event::Failed { id, error: message });

                // A failed job keeps its record (so the error stays
                // queryable) but never its directory.
                self.remove_workdir(id, &workdir).await;
            }
        }
    }

    /// The fallible middle of a job: everything between admission and the
    /// terminal-state write
    async fn execute(
        &self,
        id: JobId,
        url: &str,
        selection: &FormatSelection,
        workdir: &Path,
    ) -> Result<(PathBuf, String)> {
        tokio::fs::create_dir_all(workdir).await?;

        self.store
            .mutate(
                id,
                Box::new(|record| {
                    record.status = Status::Processing;
                    record.progress = 0.0;
                }),
            )
            .await?;
        self.emit_event(Event::Processing { id });

        let plan = self.build_plan(selection, workdir);
        let sink = Arc::new(ProgressReporter::new(
            self.store.clone(),
            id,
            self.event_tx.clone(),
        ));

        // The fetch runs on its own task: a panicking fetcher then surfaces
        // as a JoinError here instead of leaving the job stuck in
        // `processing` forever.
        let fetcher = self.fetcher.clone();
        let fetch_url = url.to_string();
        let fetch_plan = plan.clone();
        let outcome = tokio::spawn(async move { fetcher.fetch(&fetch_url, &fetch_plan, sink).await })
            .await
            .map_err(|e| {
                Error::Fetch(FetchError::Aborted {
                    reason: e.to_string(),
                })
            })??;

        let artifact_path = resolve_artifact(workdir, outcome.artifact).await?;
        let artifact_name = artifact_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.to_string());

        Ok((artifact_path, artifact_name))
    }

    /// Translate a selection plus library config into a fetch plan
    fn build_plan(&self, selection: &FormatSelection, workdir: &Path) -> FetchPlan {
        let download = &self.config.download;
        let network = &self.config.network;

        FetchPlan {
            output_dir: workdir.to_path_buf(),
            output_template: OUTPUT_TEMPLATE.to_string(),
            format_expression: format_expression(selection),
            audio_postprocess: selection.audio_only.then(|| AudioPostProcess {
                codec: download.audio_codec.clone(),
                quality: download.audio_quality.clone(),
            }),
            merge_container: (!selection.audio_only).then(|| download.merge_container.clone()),
            user_agent: network.user_agent.clone(),
            cookie_file: network.cookie_file.clone(),
            source_address: network.source_address,
        }
    }
}

/// Format expression for a selection
///
/// The `best` sentinel maps to `bestvideo+bestaudio/best` directly; naively
/// concatenating it would produce the malformed expression
/// `best+bestaudio/best`.
pub(crate) fn format_expression(selection: &FormatSelection) -> String {
    if selection.audio_only {
        "bestaudio/best".to_string()
    } else if selection.is_best() {
        "bestvideo+bestaudio/best".to_string()
    } else {
        format!("{}+bestaudio/best", selection.format_id)
    }
}

/// Determine the final artifact path after a successful fetch
///
/// Prefers the fetcher's explicit descriptor when it points at an existing
/// file; otherwise scans the working directory and takes the sole file
/// found. An empty directory is an explicit error — a fetch that produced
/// nothing must never count as success.
pub(crate) async fn resolve_artifact(
    workdir: &Path,
    explicit: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = explicit
        && tokio::fs::try_exists(&path).await.unwrap_or(false)
    {
        return Ok(path);
    }

    let mut entries = tokio::fs::read_dir(workdir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file {
            return Ok(entry.path());
        }
    }

    Err(FetchError::NoArtifact {
        dir: workdir.to_path_buf(),
    }
    .into())
}
