//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the media-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// This struct is used to generate the OpenAPI 3.1 specification that describes
/// all available endpoints, request/response types, and API behavior.
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.2.0",
        description = "REST API for managing yt-dlp media downloads, metadata probing, and real-time progress events",
        contact(
            name = "media-dl",
            url = "https://github.com/media-dl/media-dl"
        ),
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6890", description = "Local development server")
    ),
    paths(
        // Downloads
        crate::api::routes::list_downloads,
        crate::api::routes::start_download,
        crate::api::routes::get_download,
        crate::api::routes::cancel_download,

        // Media info
        crate::api::routes::probe_info,

        // Files
        crate::api::routes::serve_file,
        crate::api::routes::delete_file,

        // History
        crate::api::routes::clear_history,

        // Argument templates
        crate::api::routes::list_templates,
        crate::api::routes::create_template,
        crate::api::routes::update_template,
        crate::api::routes::delete_template,

        // Settings
        crate::api::routes::cookies_status,
        crate::api::routes::upload_cookies,
        crate::api::routes::delete_cookies,

        // System
        crate::api::routes::health_check,
        crate::api::routes::tool_version,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(
        schemas(
            crate::types::DownloadId,
            crate::types::Status,
            crate::types::Event,
            crate::types::DownloadItem,
            crate::types::DownloadRequest,
            crate::types::RequestedFormat,
            crate::types::MediaInfo,
            crate::types::FormatOption,
            crate::db::ArgumentTemplate,
            crate::api::routes::ProbeRequest,
            crate::api::routes::TemplateRequest,
            crate::error::ApiError,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "downloads", description = "Download lifecycle management"),
        (name = "info", description = "Media metadata probing"),
        (name = "files", description = "Artifact serving and deletion"),
        (name = "history", description = "Terminal-state history"),
        (name = "templates", description = "Argument template presets"),
        (name = "settings", description = "Cookies file management"),
        (name = "system", description = "Health, events, version")
    )
)]
pub struct ApiDoc;
