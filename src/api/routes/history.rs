//! History management handlers.

use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// DELETE /history - Delete all completed, errored, and cancelled downloads
#[utoipa::path(
    delete,
    path = "/api/history",
    tag = "history",
    responses(
        (status = 200, description = "History cleared, count reported"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn clear_history(State(state): State<AppState>) -> Response {
    match state.downloader.clear_history().await {
        Ok(removed) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("Cleared {} history items.", removed)
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to clear history");
            e.into_response()
        }
    }
}
