use chrono::{DateTime, FixedOffset};
use sea_orm::ColumnTrait;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{project, quotation};

use crate::errors::ServiceError;
use crate::pagination::PageParams;
use crate::repository::{FilterSortSpec, Page, Predicate, Sortable};

use super::context::{text_filter, ServiceContext};

impl Sortable for quotation::Entity {}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuotationFilter {
    pub project_id: Option<Uuid>,
    pub status: Option<String>,
    /// Substring match on the quotation number.
    pub number: Option<String>,
    pub min_amount: Option<i64>,
}

#[derive(Clone, Debug, Default)]
pub struct QuotationSpec {
    pub page: PageParams,
    pub filter: QuotationFilter,
}

impl FilterSortSpec<quotation::Entity> for QuotationSpec {
    fn page(&self) -> &PageParams {
        &self.page
    }

    fn build_predicate(&self) -> Predicate<quotation::Entity> {
        let f = &self.filter;
        Predicate::all_of([
            Predicate::all().and_if(f.project_id.map(|v| quotation::Column::ProjectId.eq(v))),
            Predicate::all().and_if(text_filter(&f.status).map(|v| quotation::Column::Status.eq(v))),
            Predicate::all().and_if(text_filter(&f.number).map(|v| quotation::Column::Number.contains(v))),
            Predicate::all().and_if(f.min_amount.map(|v| quotation::Column::Amount.gte(v))),
        ])
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuotation {
    pub project_id: Uuid,
    pub number: String,
    pub amount: i64,
    #[serde(default)]
    pub valid_until: Option<DateTime<FixedOffset>>,
}

#[derive(Clone)]
pub struct QuotationService {
    ctx: ServiceContext,
}

impl QuotationService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, spec))]
    pub async fn list(&self, mut spec: QuotationSpec) -> Result<Page<quotation::Model>, ServiceError> {
        spec.page = spec.page.with_limits(self.ctx.limits());
        let uow = self.ctx.unit_of_work();
        Ok(self.ctx.repository::<quotation::Entity>(&uow).page_matching(&spec).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<quotation::Model, ServiceError> {
        let uow = self.ctx.unit_of_work();
        self.ctx
            .repository::<quotation::Entity>(&uow)
            .find_by_key(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("quotation"))
    }

    /// New draft quotation for an existing project. Numbers are unique.
    #[instrument(skip(self, input), fields(project_id = %input.project_id))]
    pub async fn create(&self, input: NewQuotation) -> Result<quotation::Model, ServiceError> {
        let number = input.number.trim();
        if number.is_empty() {
            return Err(ServiceError::Validation("number must not be empty".into()));
        }
        if input.amount < 0 {
            return Err(ServiceError::Validation("amount must not be negative".into()));
        }

        let uow = self.ctx.unit_of_work();
        if self.ctx.repository::<project::Entity>(&uow).find_by_key(input.project_id).await?.is_none() {
            return Err(ServiceError::not_found("project"));
        }
        let quotations = self.ctx.repository::<quotation::Entity>(&uow);
        if quotations.count_where(Predicate::when(quotation::Column::Number.eq(number))).await? > 0 {
            return Err(ServiceError::Validation(format!("quotation number `{number}` already exists")));
        }

        let mut q = quotation::Model::new(input.project_id, number, input.amount);
        q.valid_until = input.valid_until;
        let created = quotations.add(q, true).await?;
        info!(quotation_id = %created.id, "quotation created");
        Ok(created)
    }
}
