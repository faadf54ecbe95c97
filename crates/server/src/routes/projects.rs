use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use tracing::info;
use uuid::Uuid;

use models::project;
use service::pagination::PageParams;
use service::repository::Page;
use service::services::{NewProject, ProjectChanges, ProjectFilter, ProjectSpec};

use crate::errors::ApiError;
use crate::routes::AppState;

#[utoipa::path(
    get, path = "/api/projects", tag = "projects",
    params(crate::openapi::PageQuery, crate::openapi::ProjectQuery),
    responses(
        (status = 200, description = "One page of projects"),
        (status = 400, description = "Unknown sort column")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Page<project::Model>>, ApiError> {
    let page = state.projects.list(ProjectSpec { page, filter }).await?;
    info!(total = page.total_count, returned = page.items.len(), "list projects");
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/api/projects/{id}", tag = "projects",
    params(("id" = Uuid, Path, description = "Project id")),
    responses((status = 200, description = "Found"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<project::Model>, ApiError> {
    Ok(Json(state.projects.get(id).await?))
}

#[utoipa::path(
    post, path = "/api/projects", tag = "projects",
    request_body = crate::openapi::NewProjectDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewProject>,
) -> Result<(StatusCode, Json<project::Model>), ApiError> {
    let created = state.projects.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/api/projects/{id}", tag = "projects",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = crate::openapi::ProjectChangesDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<ProjectChanges>,
) -> Result<Json<project::Model>, ApiError> {
    Ok(Json(state.projects.update(id, changes).await?))
}

#[utoipa::path(
    delete, path = "/api/projects/{id}", tag = "projects",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Project still referenced"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state.projects.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
