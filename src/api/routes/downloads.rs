//! Download management handlers.

use crate::api::AppState;
use crate::types::{DownloadId, DownloadRequest, Event};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /downloads - List all downloads
#[utoipa::path(
    get,
    path = "/api/downloads",
    tag = "downloads",
    responses(
        (status = 200, description = "List of all downloads, newest first", body = Vec<crate::types::DownloadItem>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_downloads(State(state): State<AppState>) -> Response {
    match state.downloader.list_downloads().await {
        Ok(downloads) => (StatusCode::OK, Json(downloads)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list downloads");
            e.into_response()
        }
    }
}

/// POST /downloads - Start a new download
#[utoipa::path(
    post,
    path = "/api/downloads",
    tag = "downloads",
    request_body = DownloadRequest,
    responses(
        (status = 201, description = "Download created and spawned", body = crate::types::DownloadItem),
        (status = 400, description = "Missing or invalid download options"),
        (status = 503, description = "Shutting down"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Response {
    match state.downloader.start_download(request).await {
        Ok(item) => {
            // Observers learn about the new queue entry right away
            state.downloader.emit_event(Event::QueueUpdated {});
            (StatusCode::CREATED, Json(item)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// GET /downloads/:id - Get single download
#[utoipa::path(
    get,
    path = "/api/downloads/{id}",
    tag = "downloads",
    params(
        ("id" = i64, Path, description = "Download ID")
    ),
    responses(
        (status = 200, description = "Download information", body = crate::types::DownloadItem),
        (status = 404, description = "Download not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_download(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.downloader.get_download(DownloadId(id)).await {
        Ok(Some(item)) => (StatusCode::OK, Json(item)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "download not found"})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(download_id = id, error = %e, "Failed to get download");
            e.into_response()
        }
    }
}

/// POST /downloads/:id/cancel - Cancel a download
#[utoipa::path(
    post,
    path = "/api/downloads/{id}/cancel",
    tag = "downloads",
    params(
        ("id" = i64, Path, description = "Download ID")
    ),
    responses(
        (status = 200, description = "Cancellation requested (a no-op if the download has no live process)"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn cancel_download(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.downloader.cancel_download(DownloadId(id)).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({"message": format!("Download {} cancelled.", id)})),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("Download {} has no active process.", id)
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
