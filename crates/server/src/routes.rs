use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::services::{ContractService, MaintenanceService, ProjectService, QuotationService, ServiceContext};

use crate::openapi::ApiDoc;

pub mod contracts;
pub mod maintenance;
pub mod projects;
pub mod quotations;

/// Handler state: one service per resource, all sharing a [`ServiceContext`].
#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub quotations: QuotationService,
    pub contracts: ContractService,
    pub maintenance: MaintenanceService,
}

impl AppState {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            projects: ProjectService::new(ctx.clone()),
            quotations: QuotationService::new(ctx.clone()),
            contracts: ContractService::new(ctx.clone()),
            maintenance: MaintenanceService::new(ctx),
        }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health, resource APIs and API docs.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/api/projects", get(projects::list).post(projects::create))
        .route("/api/projects/:id", get(projects::get).put(projects::update).delete(projects::delete))
        .route("/api/quotations", get(quotations::list).post(quotations::create))
        .route("/api/quotations/:id", get(quotations::get))
        .route("/api/quotations/:id/contract", post(quotations::sign))
        .route("/api/contracts", get(contracts::list))
        .route("/api/maintenance", get(maintenance::list).post(maintenance::open))
        .route("/api/maintenance/:id/close", post(maintenance::close))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
