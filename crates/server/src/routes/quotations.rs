use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use uuid::Uuid;

use models::{contract, quotation};
use service::pagination::PageParams;
use service::repository::Page;
use service::services::{NewQuotation, QuotationFilter, QuotationSpec, SignContract};

use crate::errors::ApiError;
use crate::routes::AppState;

#[utoipa::path(
    get, path = "/api/quotations", tag = "quotations",
    params(crate::openapi::PageQuery, crate::openapi::QuotationQuery),
    responses((status = 200, description = "One page of quotations"), (status = 400, description = "Unknown sort column"))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<QuotationFilter>,
) -> Result<Json<Page<quotation::Model>>, ApiError> {
    Ok(Json(state.quotations.list(QuotationSpec { page, filter }).await?))
}

#[utoipa::path(
    get, path = "/api/quotations/{id}", tag = "quotations",
    params(("id" = Uuid, Path, description = "Quotation id")),
    responses((status = 200, description = "Found"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<quotation::Model>, ApiError> {
    Ok(Json(state.quotations.get(id).await?))
}

#[utoipa::path(
    post, path = "/api/quotations", tag = "quotations",
    request_body = crate::openapi::NewQuotationDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewQuotation>,
) -> Result<(StatusCode, Json<quotation::Model>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.quotations.create(input).await?)))
}

/// 接受报价并生成合同（请求体可省略）
#[utoipa::path(
    post, path = "/api/quotations/{id}/contract", tag = "quotations",
    params(("id" = Uuid, Path, description = "Quotation id")),
    request_body = crate::openapi::SignContractDoc,
    responses(
        (status = 201, description = "Contract signed"),
        (status = 400, description = "Quotation cannot be signed"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn sign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<SignContract>>,
) -> Result<(StatusCode, Json<contract::Model>), ApiError> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    Ok((StatusCode::CREATED, Json(state.contracts.sign_from_quotation(id, input).await?)))
}
