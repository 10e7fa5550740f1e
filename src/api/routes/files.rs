//! Artifact serving and deletion handlers.

use crate::api::AppState;
use crate::types::DownloadId;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio_util::io::ReaderStream;

/// GET /files/:id - Serve a completed artifact as an attachment
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Download ID")
    ),
    responses(
        (status = 200, description = "File contents (attachment)", content_type = "application/octet-stream"),
        (status = 404, description = "Download or file not found"),
        (status = 409, description = "Download has not completed"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn serve_file(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let id = DownloadId(id);

    let item = match state.downloader.get_download(id).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "download not found"})),
            )
                .into_response();
        }
        Err(e) => return e.into_response(),
    };

    let path = match state.downloader.artifact_path(id).await {
        Ok(path) => path,
        Err(e) => return e.into_response(),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(download_id = id.0, path = %path.display(), error = %e, "Failed to open artifact");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "error serving file"})),
            )
                .into_response();
        }
    };

    // Download name: the display title plus the real extension on disk
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let filename = format!("{}{}", item.title, extension);

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    (
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename.replace('"', "")),
            ),
        ],
        body,
    )
        .into_response()
}

/// DELETE /files/:id - Delete an artifact and its record
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Download ID")
    ),
    responses(
        (status = 200, description = "File and record deleted"),
        (status = 404, description = "Download not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_file(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.downloader.delete_download(DownloadId(id)).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("File and record for download {} deleted.", id)
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
