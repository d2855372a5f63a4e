//! REST API server example
//!
//! This example shows how to run media-dl with the REST API enabled,
//! allowing control via HTTP endpoints.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:8750/swagger-ui
//! - Probe a URL via POST http://localhost:8750/probe
//! - Enqueue jobs via POST http://localhost:8750/jobs
//! - Monitor progress via GET http://localhost:8750/jobs/{id}
//! - Stream events via GET http://localhost:8750/events

use media_dl::api::start_api_server;
use media_dl::config::{ApiConfig, Config, DownloadConfig, ServerIntegrationConfig};
use media_dl::MediaDownloader;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Configure API
    let api_config = ApiConfig {
        bind_address: "127.0.0.1:8750".parse::<SocketAddr>()?,
        cors_enabled: true,
        cors_origins: vec!["*".to_string()],
        swagger_ui: true,
    };

    // Build configuration
    let config = Config {
        download: DownloadConfig {
            download_root: "downloads".into(),
            max_concurrent_jobs: 3,
            ..Default::default()
        },
        server: ServerIntegrationConfig { api: api_config },
        ..Default::default()
    };

    // Create the job manager (resolves yt-dlp from PATH)
    let downloader = Arc::new(MediaDownloader::new(config.clone()).await?);
    let config_arc = Arc::new(config);

    println!("media-dl API listening on http://127.0.0.1:8750");

    // Serve until the process is stopped
    start_api_server(downloader, config_arc).await?;

    Ok(())
}
