//! Probing, job submission, status and artifact retrieval handlers.

use super::{EnqueueRequest, EnqueueResponse, ProbeRequest};
use crate::api::AppState;
use crate::error::Error;
use crate::types::{FormatSelection, JobId, JobStatusInfo, MediaInfo};
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_stream::StreamExt;
use tokio_util::io::ReaderStream;

/// POST /probe - Inspect a URL for metadata and available formats
#[utoipa::path(
    post,
    path = "/probe",
    tag = "probe",
    request_body = ProbeRequest,
    responses(
        (status = 200, description = "Metadata and curated format list", body = MediaInfo),
        (status = 400, description = "Malformed URL", body = crate::error::ApiError),
        (status = 422, description = "Extraction failed", body = crate::error::ApiError),
        (status = 503, description = "Extractor tool unavailable", body = crate::error::ApiError)
    )
)]
pub async fn probe(
    State(state): State<AppState>,
    Json(request): Json<ProbeRequest>,
) -> Result<Json<MediaInfo>, Error> {
    let info = state.downloader.probe(&request.url).await?;
    Ok(Json(info))
}

/// POST /jobs - Enqueue a fetch-and-transcode job
#[utoipa::path(
    post,
    path = "/jobs",
    tag = "jobs",
    request_body = EnqueueRequest,
    responses(
        (status = 202, description = "Job accepted", body = EnqueueResponse),
        (status = 400, description = "Malformed URL", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn enqueue_job(
    State(state): State<AppState>,
    Json(request): Json<EnqueueRequest>,
) -> Result<impl IntoResponse, Error> {
    let selection = FormatSelection {
        format_id: request.format_id,
        audio_only: request.audio_only,
    };
    let job_id = state.downloader.enqueue(&request.url, selection).await?;

    Ok((StatusCode::ACCEPTED, Json(EnqueueResponse { job_id })))
}

/// GET /jobs - List all tracked jobs
#[utoipa::path(
    get,
    path = "/jobs",
    tag = "jobs",
    responses(
        (status = 200, description = "All tracked jobs, newest first", body = Vec<JobStatusInfo>)
    )
)]
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobStatusInfo>> {
    Json(state.downloader.list().await)
}

/// GET /jobs/{id} - Poll one job's status and progress
#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = JobId, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Status snapshot", body = JobStatusInfo),
        (status = 404, description = "Job not found", body = crate::error::ApiError)
    )
)]
pub async fn job_status(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<JobStatusInfo>, Error> {
    let info = state.downloader.query(id).await?;
    Ok(Json(info))
}

/// GET /jobs/{id}/file - Stream a completed job's artifact
///
/// Once the response body has been fully delivered (or the client goes
/// away), the job's working directory and record are cleaned up; a second
/// request for the same id returns 404.
#[utoipa::path(
    get,
    path = "/jobs/{id}/file",
    tag = "jobs",
    params(
        ("id" = JobId, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Artifact bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Job not found", body = crate::error::ApiError),
        (status = 409, description = "Job not completed yet", body = crate::error::ApiError)
    )
)]
pub async fn retrieve_artifact(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Response, Error> {
    let artifact = state.downloader.retrieve(id).await?;
    let crate::manager::Artifact {
        file,
        filename,
        len,
        cleanup,
    } = artifact;

    // The ticket rides inside the stream: cleanup fires when the body has
    // been fully sent or the client disconnects mid-transfer.
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _ = &cleanup;
        chunk
    });

    let disposition = content_disposition(&filename);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, len)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(stream))
        .map_err(|e| Error::ApiServerError(e.to_string()))?;

    Ok(response)
}

/// Build an attachment Content-Disposition, defusing header-breaking bytes
fn content_disposition(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' | '\r' | '\n' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("attachment; filename=\"{sanitized}\"")
}
