use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Paging and sorting shared by every list endpoint.
#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based; values <= 0 are treated as 1
    pub page_number: Option<i64>,
    /// Defaults to 10; values outside 1..=50 fall back to the default
    pub page_size: Option<i64>,
    /// Field name, e.g. `name` or `createdAt`; defaults to `Id`
    pub sort_column: Option<String>,
    /// `asc` or `desc` (default)
    pub sort_dir: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProjectQuery {
    pub name: Option<String>,
    pub customer: Option<String>,
    pub status: Option<String>,
    pub min_budget: Option<i64>,
    pub max_budget: Option<i64>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QuotationQuery {
    pub project_id: Option<Uuid>,
    pub status: Option<String>,
    pub number: Option<String>,
    pub min_amount: Option<i64>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ContractQuery {
    pub project_id: Option<Uuid>,
    pub status: Option<String>,
    pub number: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MaintenanceQuery {
    pub contract_id: Option<Uuid>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub min_priority: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct NewProjectDoc { pub name: String, pub customer: String, pub budget: i64 }

#[derive(Serialize, ToSchema)]
pub struct ProjectChangesDoc {
    pub name: Option<String>,
    pub customer: Option<String>,
    pub status: Option<String>,
    pub budget: Option<i64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewQuotationDoc {
    pub project_id: Uuid,
    pub number: String,
    pub amount: i64,
    pub valid_until: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SignContractDoc { pub number: Option<String> }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMaintenanceRequestDoc {
    pub contract_id: Uuid,
    pub title: String,
    pub category: String,
    pub priority: Option<i32>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::projects::list,
        crate::routes::projects::get,
        crate::routes::projects::create,
        crate::routes::projects::update,
        crate::routes::projects::delete,
        crate::routes::quotations::list,
        crate::routes::quotations::get,
        crate::routes::quotations::create,
        crate::routes::quotations::sign,
        crate::routes::contracts::list,
        crate::routes::maintenance::list,
        crate::routes::maintenance::open,
        crate::routes::maintenance::close,
    ),
    components(
        schemas(
            HealthResponse,
            NewProjectDoc,
            ProjectChangesDoc,
            NewQuotationDoc,
            SignContractDoc,
            NewMaintenanceRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "projects"),
        (name = "quotations"),
        (name = "contracts"),
        (name = "maintenance")
    )
)]
pub struct ApiDoc;
