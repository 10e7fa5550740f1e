//! Argument template CRUD handlers.

use super::TemplateRequest;
use crate::api::AppState;
use crate::db::NewArgumentTemplate;
use crate::error::Error;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

fn validate(request: &TemplateRequest) -> Result<NewArgumentTemplate, Error> {
    if request.name.trim().is_empty() || request.args.trim().is_empty() {
        return Err(Error::InvalidInput(
            "name and args are required for a template".to_string(),
        ));
    }
    Ok(NewArgumentTemplate {
        name: request.name.clone(),
        args: request.args.clone(),
    })
}

/// GET /templates - List all argument templates
#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "templates",
    responses(
        (status = 200, description = "All templates", body = Vec<crate::db::ArgumentTemplate>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_templates(State(state): State<AppState>) -> Response {
    match state.downloader.db.list_templates().await {
        Ok(templates) => (StatusCode::OK, Json(templates)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /templates - Create an argument template
#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "templates",
    request_body = TemplateRequest,
    responses(
        (status = 201, description = "Template created", body = crate::db::ArgumentTemplate),
        (status = 400, description = "Name or args missing"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<TemplateRequest>,
) -> Response {
    let new_template = match validate(&request) {
        Ok(t) => t,
        Err(e) => return e.into_response(),
    };

    match state.downloader.db.insert_template(&new_template).await {
        Ok(template) => {
            tracing::info!(name = %template.name, "Created template");
            (StatusCode::CREATED, Json(template)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// PUT /templates/:id - Update an argument template
#[utoipa::path(
    put,
    path = "/api/templates/{id}",
    tag = "templates",
    params(
        ("id" = i64, Path, description = "Template ID")
    ),
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = crate::db::ArgumentTemplate),
        (status = 400, description = "Name or args missing"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<TemplateRequest>,
) -> Response {
    let new_template = match validate(&request) {
        Ok(t) => t,
        Err(e) => return e.into_response(),
    };

    match state.downloader.db.update_template(id, &new_template).await {
        Ok(Some(template)) => {
            tracing::info!(template_id = id, name = %template.name, "Updated template");
            (StatusCode::OK, Json(template)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "template not found"})),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /templates/:id - Delete an argument template
#[utoipa::path(
    delete,
    path = "/api/templates/{id}",
    tag = "templates",
    params(
        ("id" = i64, Path, description = "Template ID")
    ),
    responses(
        (status = 204, description = "Template deleted"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_template(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.downloader.db.delete_template(id).await {
        Ok(true) => {
            tracing::info!(template_id = id, "Deleted template");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "template not found"})),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
