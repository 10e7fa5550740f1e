//! Settings handlers — cookies file management.
//!
//! yt-dlp reads site cookies from a Netscape-format file. The file lives
//! at the configured path; its presence is what enables the `--cookies`
//! flag on downloads and probes.

use crate::api::AppState;
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /settings/cookies - Whether a cookies file is currently present
#[utoipa::path(
    get,
    path = "/api/settings/cookies",
    tag = "settings",
    responses(
        (status = 200, description = "Cookies presence flag")
    )
)]
pub async fn cookies_status(State(state): State<AppState>) -> Response {
    let has_cookies = tokio::fs::try_exists(&state.config.tools.cookies_file)
        .await
        .unwrap_or(false);

    (StatusCode::OK, Json(json!({"hasCookies": has_cookies}))).into_response()
}

/// POST /settings/cookies - Upload a cookies file (multipart/form-data)
#[utoipa::path(
    post,
    path = "/api/settings/cookies",
    tag = "settings",
    request_body(content = Vec<u8>, description = "Cookies file upload (multipart/form-data)", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Cookies file stored"),
        (status = 400, description = "No file in the upload"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_cookies(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let data = match multipart.next_field().await {
        Ok(Some(field)) => match field.bytes().await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read uploaded cookies field");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed multipart upload");
            None
        }
    };

    let Some(data) = data else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "no file uploaded"})),
        )
            .into_response();
    };

    let path = &state.config.tools.cookies_file;
    if let Some(parent) = path.parent()
        && let Err(e) = tokio::fs::create_dir_all(parent).await
    {
        tracing::error!(error = %e, "Failed to create cookies directory");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "failed to store cookies file"})),
        )
            .into_response();
    }

    match tokio::fs::write(path, &data).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Cookies file uploaded");
            (
                StatusCode::OK,
                Json(json!({"message": "Cookies file uploaded successfully."})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to write cookies file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to store cookies file"})),
            )
                .into_response()
        }
    }
}

/// DELETE /settings/cookies - Remove the cookies file
#[utoipa::path(
    delete,
    path = "/api/settings/cookies",
    tag = "settings",
    responses(
        (status = 200, description = "Cookies file removed (or was already absent)"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_cookies(State(state): State<AppState>) -> Response {
    let path = &state.config.tools.cookies_file;

    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Cookies file deleted");
            (
                StatusCode::OK,
                Json(json!({"message": "Cookies file cleared successfully."})),
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (
            StatusCode::OK,
            Json(json!({"message": "Cookies file already cleared."})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to delete cookies file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to clear cookies file"})),
            )
                .into_response()
        }
    }
}
