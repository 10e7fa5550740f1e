//! Media metadata probe handler.

use super::ProbeRequest;
use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /info - Probe a URL for metadata and available formats
#[utoipa::path(
    post,
    path = "/api/info",
    tag = "info",
    request_body = ProbeRequest,
    responses(
        (status = 200, description = "Media metadata with partitioned formats", body = crate::types::MediaInfo),
        (status = 400, description = "URL missing"),
        (status = 502, description = "Probe failed or returned unparseable output")
    )
)]
pub async fn probe_info(
    State(state): State<AppState>,
    Json(request): Json<ProbeRequest>,
) -> Response {
    match state.downloader.probe_media_info(&request.url).await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => {
            tracing::error!(url = %request.url, error = %e, "Probe failed");
            e.into_response()
        }
    }
}
