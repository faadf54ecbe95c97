use axum::{extract::{Query, State}, Json};

use models::contract;
use service::pagination::PageParams;
use service::repository::Page;
use service::services::{ContractFilter, ContractSpec};

use crate::errors::ApiError;
use crate::routes::AppState;

#[utoipa::path(
    get, path = "/api/contracts", tag = "contracts",
    params(crate::openapi::PageQuery, crate::openapi::ContractQuery),
    responses((status = 200, description = "One page of contracts"), (status = 400, description = "Unknown sort column"))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ContractFilter>,
) -> Result<Json<Page<contract::Model>>, ApiError> {
    Ok(Json(state.contracts.list(ContractSpec { page, filter }).await?))
}
