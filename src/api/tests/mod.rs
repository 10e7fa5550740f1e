use super::*;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

mod files;
mod templates;

/// Helper to create a test MediaDownloader instance wrapped in Arc
async fn create_test_downloader() -> (Arc<MediaDownloader>, tempfile::TempDir) {
    let (downloader, temp_dir) = crate::downloader::test_helpers::create_test_downloader().await;
    (Arc::new(downloader), temp_dir)
}

/// Build a router over a fresh test downloader
async fn test_app() -> (Router, Arc<MediaDownloader>, tempfile::TempDir) {
    let (downloader, temp_dir) = create_test_downloader().await;
    let config = downloader.get_config();
    let app = create_router(downloader.clone(), config);
    (app, downloader, temp_dir)
}

/// Insert a bare record directly, bypassing process spawn
async fn insert_record(downloader: &MediaDownloader) -> crate::types::DownloadId {
    downloader
        .db
        .insert_download(&crate::db::NewDownload {
            url: "https://example.com/v".into(),
            title: "My Video".into(),
            thumbnail: "https://example.com/t.jpg".into(),
            format_id: "best".into(),
            format_label: "Best".into(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _downloader, _tmp) = test_app().await;

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_cors_headers_present_when_enabled() {
    let (downloader, _tmp) = create_test_downloader().await;

    let mut config = (*downloader.get_config()).clone();
    config.api.cors_enabled = true;
    config.api.cors_origins = vec!["*".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (downloader, _tmp) = create_test_downloader().await;

    // Port 0 = OS assigns a free port
    let mut config = (*downloader.get_config()).clone();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let downloader = downloader.clone();
        let config = config.clone();
        async move { start_api_server(downloader, config).await }
    });

    // Give it a moment to start, then stop it
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    api_handle.abort();
}

#[tokio::test]
async fn test_spawn_api_server_method() {
    let (downloader, _tmp) = create_test_downloader().await;

    let mut config = (*downloader.get_config()).clone();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let downloader = Arc::new(
        MediaDownloader::with_registry(config, crate::registry::JobRegistry::new())
            .await
            .unwrap(),
    );

    let api_handle = downloader.spawn_api_server();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    api_handle.abort();
}
