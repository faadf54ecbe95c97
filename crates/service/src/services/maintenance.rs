use sea_orm::ColumnTrait;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{contract, maintenance_request, timestamp_now};

use crate::errors::ServiceError;
use crate::pagination::PageParams;
use crate::repository::{FilterSortSpec, Page, Predicate, SortColumns, Sortable};

use super::context::{text_filter, ServiceContext};

impl Sortable for maintenance_request::Entity {
    fn sort_columns() -> SortColumns<Self> {
        use maintenance_request::Column;
        SortColumns::only([
            Column::Id,
            Column::Title,
            Column::Category,
            Column::Priority,
            Column::Status,
            Column::CreatedAt,
            Column::ClosedAt,
        ])
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaintenanceFilter {
    pub contract_id: Option<Uuid>,
    pub category: Option<String>,
    pub status: Option<String>,
    /// Lowest priority number to include.
    pub min_priority: Option<i32>,
}

#[derive(Clone, Debug, Default)]
pub struct MaintenanceSpec {
    pub page: PageParams,
    pub filter: MaintenanceFilter,
}

impl FilterSortSpec<maintenance_request::Entity> for MaintenanceSpec {
    fn page(&self) -> &PageParams {
        &self.page
    }

    fn build_predicate(&self) -> Predicate<maintenance_request::Entity> {
        let f = &self.filter;
        Predicate::all()
            .and_if(f.contract_id.map(|v| maintenance_request::Column::ContractId.eq(v)))
            .and_if(text_filter(&f.category).map(|v| maintenance_request::Column::Category.eq(v)))
            .and_if(text_filter(&f.status).map(|v| maintenance_request::Column::Status.eq(v)))
            .and_if(f.min_priority.map(|v| maintenance_request::Column::Priority.gte(v)))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMaintenanceRequest {
    pub contract_id: Uuid,
    pub title: String,
    pub category: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 { 3 }

#[derive(Clone)]
pub struct MaintenanceService {
    ctx: ServiceContext,
}

impl MaintenanceService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, spec))]
    pub async fn list(&self, mut spec: MaintenanceSpec) -> Result<Page<maintenance_request::Model>, ServiceError> {
        spec.page = spec.page.with_limits(self.ctx.limits());
        let uow = self.ctx.unit_of_work();
        Ok(self.ctx.repository::<maintenance_request::Entity>(&uow).page_matching(&spec).await?)
    }

    /// Open a request against a contract that has not been terminated.
    #[instrument(skip(self, input), fields(contract_id = %input.contract_id))]
    pub async fn open(&self, input: NewMaintenanceRequest) -> Result<maintenance_request::Model, ServiceError> {
        let title = input.title.trim();
        let category = input.category.trim();
        if title.is_empty() || category.is_empty() {
            return Err(ServiceError::Validation("title and category are required".into()));
        }
        if !(1..=5).contains(&input.priority) {
            return Err(ServiceError::Validation("priority must be between 1 and 5".into()));
        }

        let uow = self.ctx.unit_of_work();
        let c = self
            .ctx
            .repository::<contract::Entity>(&uow)
            .find_by_key(input.contract_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("contract"))?;
        if c.status == contract::status::TERMINATED {
            return Err(ServiceError::Validation("contract is terminated".into()));
        }

        let request = maintenance_request::Model::open(c.id, title, category, input.priority);
        let opened = self.ctx.repository::<maintenance_request::Entity>(&uow).add(request, true).await?;
        info!(request_id = %opened.id, "maintenance request opened");
        Ok(opened)
    }

    /// Closing an already closed request returns it unchanged.
    #[instrument(skip(self))]
    pub async fn close(&self, id: Uuid) -> Result<maintenance_request::Model, ServiceError> {
        let uow = self.ctx.unit_of_work();
        let requests = self.ctx.repository::<maintenance_request::Entity>(&uow);
        let mut request = requests.find_by_key(id).await?.ok_or_else(|| ServiceError::not_found("maintenance request"))?;
        if request.status == maintenance_request::status::CLOSED {
            return Ok(request);
        }
        request.status = maintenance_request::status::CLOSED.to_string();
        request.closed_at = Some(timestamp_now());
        Ok(requests.update(request, true).await?)
    }

    /// The single open request of a category on a contract, if any.
    /// Fails when the category has more than one open request.
    #[instrument(skip(self))]
    pub async fn open_in_category(&self, contract_id: Uuid, category: &str) -> Result<Option<maintenance_request::Model>, ServiceError> {
        let uow = self.ctx.unit_of_work();
        let predicate = Predicate::all_of([
            Predicate::when(maintenance_request::Column::ContractId.eq(contract_id)),
            Predicate::when(maintenance_request::Column::Category.eq(category)),
            Predicate::when(maintenance_request::Column::Status.ne(maintenance_request::status::CLOSED)),
        ]);
        Ok(self.ctx.repository::<maintenance_request::Entity>(&uow).single_matching(predicate).await?)
    }
}
