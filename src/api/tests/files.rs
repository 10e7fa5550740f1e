use super::*;

#[tokio::test]
async fn serve_file_returns_attachment_for_completed_download() {
    let (app, downloader, _tmp) = test_app().await;

    let id = insert_record(&downloader).await;
    downloader.db.mark_completed(id, Some("1.mp4")).await.unwrap();
    let file = downloader.get_config().download_dir().join("1.mp4");
    tokio::fs::write(&file, b"video bytes").await.unwrap();

    let request = Request::builder()
        .uri(format!("/api/files/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert!(
        disposition.contains("My Video.mp4"),
        "served filename should be the title plus the on-disk extension: {disposition}"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"video bytes");
}

#[tokio::test]
async fn serve_file_for_unknown_download_is_404() {
    let (app, _downloader, _tmp) = test_app().await;

    let request = Request::builder()
        .uri("/api/files/999")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serve_file_for_incomplete_download_is_409() {
    let (app, downloader, _tmp) = test_app().await;
    let id = insert_record(&downloader).await;

    let request = Request::builder()
        .uri(format!("/api/files/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.status(),
        StatusCode::CONFLICT,
        "a download that has not completed has no servable file"
    );
}

#[tokio::test]
async fn serve_file_missing_on_disk_is_404() {
    let (app, downloader, _tmp) = test_app().await;

    let id = insert_record(&downloader).await;
    downloader.db.mark_completed(id, Some("gone.mp4")).await.unwrap();

    let request = Request::builder()
        .uri(format!("/api/files/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_file_removes_artifact_and_record() {
    let (app, downloader, _tmp) = test_app().await;

    let id = insert_record(&downloader).await;
    downloader.db.mark_completed(id, Some("1.mp4")).await.unwrap();
    let file = downloader.get_config().download_dir().join("1.mp4");
    tokio::fs::write(&file, b"video bytes").await.unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/files/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!file.exists());
    assert!(downloader.get_download(id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_file_for_unknown_download_is_404() {
    let (app, _downloader, _tmp) = test_app().await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/files/999")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
