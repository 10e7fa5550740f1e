use super::*;
use crate::db::ArgumentTemplate;

async fn create_via_api(app: &Router, name: &str, args: &str) -> ArgumentTemplate {
    let payload = serde_json::json!({"name": name, "args": args});
    let request = Request::builder()
        .method("POST")
        .uri("/api/templates")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn template_crud_round_trip() {
    let (app, _downloader, _tmp) = test_app().await;

    // Create
    let created = create_via_api(&app, "Audio rip", "--embed-thumbnail").await;
    assert_eq!(created.name, "Audio rip");

    // List
    let request = Request::builder()
        .uri("/api/templates")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let templates: Vec<ArgumentTemplate> = serde_json::from_slice(&body).unwrap();
    assert_eq!(templates.len(), 1);

    // Update
    let payload = serde_json::json!({"name": "Video rip", "args": "--write-subs"});
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/templates/{}", created.id))
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let updated: ArgumentTemplate = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.name, "Video rip");
    assert_eq!(updated.args, "--write-subs");

    // Delete
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/templates/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/templates/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_template_with_empty_name_is_400() {
    let (app, _downloader, _tmp) = test_app().await;

    let payload = serde_json::json!({"name": "", "args": "--something"});
    let request = Request::builder()
        .method("POST")
        .uri("/api/templates")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_template_is_404() {
    let (app, _downloader, _tmp) = test_app().await;

    let payload = serde_json::json!({"name": "Ghost", "args": "--nothing"});
    let request = Request::builder()
        .method("PUT")
        .uri("/api/templates/999")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
