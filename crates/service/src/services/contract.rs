use sea_orm::ColumnTrait;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::{contract, quotation};

use crate::errors::ServiceError;
use crate::pagination::PageParams;
use crate::repository::{FilterSortSpec, Page, Predicate, Sortable, UnitOfWork};

use super::context::{text_filter, ServiceContext};

impl Sortable for contract::Entity {}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContractFilter {
    pub project_id: Option<Uuid>,
    pub status: Option<String>,
    pub number: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ContractSpec {
    pub page: PageParams,
    pub filter: ContractFilter,
}

impl FilterSortSpec<contract::Entity> for ContractSpec {
    fn page(&self) -> &PageParams {
        &self.page
    }

    fn build_predicate(&self) -> Predicate<contract::Entity> {
        let f = &self.filter;
        Predicate::all()
            .and_if(f.project_id.map(|v| contract::Column::ProjectId.eq(v)))
            .and_if(text_filter(&f.status).map(|v| contract::Column::Status.eq(v)))
            .and_if(text_filter(&f.number).map(|v| contract::Column::Number.contains(v)))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SignContract {
    /// Defaults to `C-<quotation number>`.
    pub number: Option<String>,
}

#[derive(Clone)]
pub struct ContractService {
    ctx: ServiceContext,
}

impl ContractService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, spec))]
    pub async fn list(&self, mut spec: ContractSpec) -> Result<Page<contract::Model>, ServiceError> {
        spec.page = spec.page.with_limits(self.ctx.limits());
        let uow = self.ctx.unit_of_work();
        Ok(self.ctx.repository::<contract::Entity>(&uow).page_matching(&spec).await?)
    }

    /// Accept a quotation and sign a contract for its amount. Both writes
    /// commit together or not at all.
    #[instrument(skip(self, input))]
    pub async fn sign_from_quotation(&self, quotation_id: Uuid, input: SignContract) -> Result<contract::Model, ServiceError> {
        let uow = self.ctx.unit_of_work();
        uow.begin_transaction().await?;
        match self.sign_in(&uow, quotation_id, input).await {
            Ok(signed) => {
                uow.commit_transaction().await?;
                info!(contract_id = %signed.id, %quotation_id, "contract signed");
                Ok(signed)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    warn!(error = %rollback_err, "rollback after failed signing also failed");
                }
                Err(err)
            }
        }
    }

    async fn sign_in(&self, uow: &UnitOfWork, quotation_id: Uuid, input: SignContract) -> Result<contract::Model, ServiceError> {
        let quotations = self.ctx.repository::<quotation::Entity>(uow);
        let contracts = self.ctx.repository::<contract::Entity>(uow);

        let mut q = quotations.find_by_key(quotation_id).await?.ok_or_else(|| ServiceError::not_found("quotation"))?;
        match q.status.as_str() {
            quotation::status::DRAFT | quotation::status::SENT => {}
            other => {
                return Err(ServiceError::Validation(format!("quotation is {other} and cannot be signed")));
            }
        }

        let number = match text_filter(&input.number) {
            Some(n) => n.to_string(),
            None => format!("C-{}", q.number),
        };
        if contracts.count_where(Predicate::when(contract::Column::Number.eq(number.as_str()))).await? > 0 {
            return Err(ServiceError::Validation(format!("contract number `{number}` already exists")));
        }

        q.status = quotation::status::ACCEPTED.to_string();
        let signed = contract::Model::signed(q.project_id, Some(q.id), &number, q.amount);
        // staged on the shared session; flushed by the commit
        quotations.update(q, false).await?;
        Ok(contracts.add(signed, false).await?)
    }
}
