//! REST API server module
//!
//! Provides an OpenAPI 3.1 compliant REST API for managing downloads,
//! probing media metadata, and observing the event stream.

use crate::{Config, MediaDownloader, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Downloads
/// - `GET /api/downloads` - List all downloads
/// - `POST /api/downloads` - Start a new download
/// - `GET /api/downloads/:id` - Get single download
/// - `POST /api/downloads/:id/cancel` - Cancel a download
///
/// ## Media Info
/// - `POST /api/info` - Probe a URL for metadata and formats
/// - `GET /api/version` - yt-dlp version
///
/// ## Files
/// - `GET /api/files/:id` - Serve a completed artifact
/// - `DELETE /api/files/:id` - Delete artifact and record
///
/// ## History
/// - `DELETE /api/history` - Clear all terminal records
///
/// ## Argument Templates
/// - `GET /api/templates` - List templates
/// - `POST /api/templates` - Create template
/// - `PUT /api/templates/:id` - Update template
/// - `DELETE /api/templates/:id` - Delete template
///
/// ## Settings
/// - `GET /api/settings/cookies` - Whether a cookies file is present
/// - `POST /api/settings/cookies` - Upload a cookies file (multipart)
/// - `DELETE /api/settings/cookies` - Remove the cookies file
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/events` - Server-sent events stream
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(downloader: Arc<MediaDownloader>, config: Arc<Config>) -> Router {
    let state = AppState::new(downloader, config.clone());

    let api = Router::new()
        // Downloads
        .route("/downloads", get(routes::list_downloads))
        .route("/downloads", post(routes::start_download))
        .route("/downloads/:id", get(routes::get_download))
        .route("/downloads/:id/cancel", post(routes::cancel_download))
        // Media info
        .route("/info", post(routes::probe_info))
        .route("/version", get(routes::tool_version))
        // Files
        .route("/files/:id", get(routes::serve_file))
        .route("/files/:id", delete(routes::delete_file))
        // History
        .route("/history", delete(routes::clear_history))
        // Argument templates
        .route("/templates", get(routes::list_templates))
        .route("/templates", post(routes::create_template))
        .route("/templates/:id", put(routes::update_template))
        .route("/templates/:id", delete(routes::delete_template))
        // Settings
        .route("/settings/cookies", get(routes::cookies_status))
        .route("/settings/cookies", post(routes::upload_cookies))
        .route("/settings/cookies", delete(routes::delete_cookies))
        // System
        .route("/health", get(routes::health_check))
        .route("/events", get(routes::event_stream))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = Router::new().nest("/api", api);

    // Merge Swagger UI routes if enabled in config (before applying state).
    // SwaggerUi serves its own copy of the spec at /api-docs/openapi.json;
    // the /api/openapi.json handler above stays the canonical endpoint.
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    // Add state to all routes
    let router = router.with_state(state);

    // Apply CORS middleware if enabled in config
    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// # Arguments
///
/// * `origins` - List of allowed origins (supports "*" for any origin)
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        // Allow all origins (default for local development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Allow specific origins
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Creates a TCP listener, binds it to the configured address, and serves
/// the API router until the server is shut down.
///
/// # Example
///
/// ```no_run
/// use media_dl::{MediaDownloader, Config};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let downloader = Arc::new(MediaDownloader::new((*config).clone()).await?);
///
/// // Start API server (blocks until shutdown)
/// media_dl::api::start_api_server(downloader, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    downloader: Arc<MediaDownloader>,
    config: Arc<Config>,
) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(downloader, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
