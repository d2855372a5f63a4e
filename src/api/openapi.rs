//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the media-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// This struct is used to generate the OpenAPI 3.1 specification that
/// describes all available endpoints, request/response types, and API
/// behavior.
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "REST API for probing media URLs and managing asynchronous fetch-and-transcode jobs",
        contact(
            name = "media-dl",
            url = "https://github.com/media-dl/media-dl"
        ),
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8750", description = "Local development server")
    ),
    paths(
        // Probing and jobs
        crate::api::routes::probe,
        crate::api::routes::enqueue_job,
        crate::api::routes::list_jobs,
        crate::api::routes::job_status,
        crate::api::routes::retrieve_artifact,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
        crate::api::routes::shutdown,
    ),
    components(
        schemas(
            crate::types::JobId,
            crate::types::Status,
            crate::types::JobStatusInfo,
            crate::types::FormatSelection,
            crate::types::FormatInfo,
            crate::types::MediaInfo,
            crate::types::Event,
            crate::error::ApiError,
            crate::error::ErrorDetail,
            crate::api::routes::ProbeRequest,
            crate::api::routes::EnqueueRequest,
            crate::api::routes::EnqueueResponse,
        )
    ),
    tags(
        (name = "probe", description = "Metadata and format inspection"),
        (name = "jobs", description = "Job lifecycle: enqueue, poll, retrieve"),
        (name = "system", description = "Health, events and shutdown")
    )
)]
pub struct ApiDoc;
