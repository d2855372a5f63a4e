use super::*;
use crate::MediaDownloader;
use crate::manager::test_helpers::{
    MockFetcher, TEST_URL, best_video, create_test_downloader, wait_for_terminal, wait_until,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;


/// Helper to create a router plus handles to the manager behind it
async fn test_app() -> (
    Router,
    Arc<MediaDownloader>,
    Arc<MockFetcher>,
    tempfile::TempDir,
) {
    let (downloader, fetcher, temp_dir) = create_test_downloader().await;
    let downloader = Arc::new(downloader);
    let config = downloader.get_config();
    let app = create_router(downloader.clone(), config);
    (app, downloader, fetcher, temp_dir)
}

/// Build a router around an explicitly constructed manager
fn app_for(downloader: Arc<MediaDownloader>) -> Router {
    let config = downloader.get_config();
    create_router(downloader, config)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("valid JSON body")
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}
