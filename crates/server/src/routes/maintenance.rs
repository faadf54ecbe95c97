use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use uuid::Uuid;

use models::maintenance_request;
use service::pagination::PageParams;
use service::repository::Page;
use service::services::{MaintenanceFilter, MaintenanceSpec, NewMaintenanceRequest};

use crate::errors::ApiError;
use crate::routes::AppState;

#[utoipa::path(
    get, path = "/api/maintenance", tag = "maintenance",
    params(crate::openapi::PageQuery, crate::openapi::MaintenanceQuery),
    responses((status = 200, description = "One page of maintenance requests"), (status = 400, description = "Unknown sort column"))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<MaintenanceFilter>,
) -> Result<Json<Page<maintenance_request::Model>>, ApiError> {
    Ok(Json(state.maintenance.list(MaintenanceSpec { page, filter }).await?))
}

#[utoipa::path(
    post, path = "/api/maintenance", tag = "maintenance",
    request_body = crate::openapi::NewMaintenanceRequestDoc,
    responses(
        (status = 201, description = "Opened"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Contract not found")
    )
)]
pub async fn open(
    State(state): State<AppState>,
    Json(input): Json<NewMaintenanceRequest>,
) -> Result<(StatusCode, Json<maintenance_request::Model>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.maintenance.open(input).await?)))
}

#[utoipa::path(
    post, path = "/api/maintenance/{id}/close", tag = "maintenance",
    params(("id" = Uuid, Path, description = "Maintenance request id")),
    responses((status = 200, description = "Closed"), (status = 404, description = "Not Found"))
)]
pub async fn close(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<maintenance_request::Model>, ApiError> {
    Ok(Json(state.maintenance.close(id).await?))
}
