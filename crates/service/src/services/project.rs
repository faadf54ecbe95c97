//! Project CRUD.

use sea_orm::ColumnTrait;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{contract, project, quotation, timestamp_now};

use crate::errors::ServiceError;
use crate::pagination::PageParams;
use crate::repository::{FilterSortSpec, Page, Predicate, Repository, SortColumns, Sortable};

use super::context::{text_filter, ServiceContext};

impl Sortable for project::Entity {
    fn sort_columns() -> SortColumns<Self> {
        SortColumns::all().alias("amount", project::Column::Budget)
    }
}

/// Optional list filters; unset or blank fields do not constrain the result.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectFilter {
    /// Substring match on the name.
    pub name: Option<String>,
    pub customer: Option<String>,
    pub status: Option<String>,
    pub min_budget: Option<i64>,
    pub max_budget: Option<i64>,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectSpec {
    pub page: PageParams,
    pub filter: ProjectFilter,
}

impl FilterSortSpec<project::Entity> for ProjectSpec {
    fn page(&self) -> &PageParams {
        &self.page
    }

    fn build_predicate(&self) -> Predicate<project::Entity> {
        let f = &self.filter;
        Predicate::all()
            .and_if(text_filter(&f.name).map(|v| project::Column::Name.contains(v)))
            .and_if(text_filter(&f.customer).map(|v| project::Column::Customer.eq(v)))
            .and_if(text_filter(&f.status).map(|v| project::Column::Status.eq(v)))
            .and_if(f.min_budget.map(|v| project::Column::Budget.gte(v)))
            .and_if(f.max_budget.map(|v| project::Column::Budget.lte(v)))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub customer: String,
    #[serde(default)]
    pub budget: i64,
}

/// Partial update; `None` keeps the current value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub customer: Option<String>,
    pub status: Option<String>,
    pub budget: Option<i64>,
}

const STATUSES: [&str; 4] = [
    project::status::PLANNED,
    project::status::ACTIVE,
    project::status::ON_HOLD,
    project::status::CLOSED,
];

fn require_text(value: &str, field: &str) -> Result<String, ServiceError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ServiceError::Validation(format!("{field} must not be empty")));
    }
    Ok(v.to_string())
}

fn require_budget(budget: i64) -> Result<i64, ServiceError> {
    if budget < 0 {
        return Err(ServiceError::Validation("budget must not be negative".into()));
    }
    Ok(budget)
}

#[derive(Clone)]
pub struct ProjectService {
    ctx: ServiceContext,
}

impl ProjectService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, spec))]
    pub async fn list(&self, mut spec: ProjectSpec) -> Result<Page<project::Model>, ServiceError> {
        spec.page = spec.page.with_limits(self.ctx.limits());
        let uow = self.ctx.unit_of_work();
        let projects = self.ctx.repository::<project::Entity>(&uow);
        Ok(projects.page_matching(&spec).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<project::Model, ServiceError> {
        let uow = self.ctx.unit_of_work();
        let projects = self.ctx.repository::<project::Entity>(&uow);
        projects.find_by_key(id).await?.ok_or_else(|| ServiceError::not_found("project"))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewProject) -> Result<project::Model, ServiceError> {
        let name = require_text(&input.name, "name")?;
        let customer = require_text(&input.customer, "customer")?;
        let budget = require_budget(input.budget)?;

        let uow = self.ctx.unit_of_work();
        let projects = self.ctx.repository::<project::Entity>(&uow);
        let created = projects.add(project::Model::new(&name, &customer, budget), true).await?;
        info!(project_id = %created.id, "project created");
        Ok(created)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: Uuid, changes: ProjectChanges) -> Result<project::Model, ServiceError> {
        let uow = self.ctx.unit_of_work();
        let projects = self.ctx.repository::<project::Entity>(&uow);
        let mut current = projects.find_by_key(id).await?.ok_or_else(|| ServiceError::not_found("project"))?;

        if let Some(name) = changes.name {
            current.name = require_text(&name, "name")?;
        }
        if let Some(customer) = changes.customer {
            current.customer = require_text(&customer, "customer")?;
        }
        if let Some(status) = changes.status {
            let status = status.trim().to_ascii_lowercase();
            if !STATUSES.contains(&status.as_str()) {
                return Err(ServiceError::Validation(format!("unknown project status `{status}`")));
            }
            current.status = status;
        }
        if let Some(budget) = changes.budget {
            current.budget = require_budget(budget)?;
        }
        current.updated_at = timestamp_now();

        Ok(projects.update(current, true).await?)
    }

    /// Refuses while quotations or contracts still reference the project.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let uow = self.ctx.unit_of_work();
        let projects = self.ctx.repository::<project::Entity>(&uow);
        let current = projects.find_by_key(id).await?.ok_or_else(|| ServiceError::not_found("project"))?;

        let quotations = uow
            .repository::<quotation::Entity>()
            .count_where(Predicate::when(quotation::Column::ProjectId.eq(id)))
            .await?;
        let contracts = uow
            .repository::<contract::Entity>()
            .count_where(Predicate::when(contract::Column::ProjectId.eq(id)))
            .await?;
        if quotations + contracts > 0 {
            return Err(ServiceError::Validation(format!(
                "project still has {quotations} quotation(s) and {contracts} contract(s)"
            )));
        }

        projects.remove(current, true).await?;
        info!(project_id = %id, "project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SortDirection;
    use crate::test_support::memory_db;

    async fn service() -> anyhow::Result<ProjectService> {
        Ok(ProjectService::new(ServiceContext::new(memory_db().await?)))
    }

    fn new_project(name: &str, customer: &str, budget: i64) -> NewProject {
        NewProject { name: name.into(), customer: customer.into(), budget }
    }

    #[test]
    fn no_filters_match_everything() {
        assert!(ProjectSpec::default().build_predicate().is_match_all());
        let blank = ProjectSpec {
            filter: ProjectFilter { name: Some("  ".into()), ..Default::default() },
            ..Default::default()
        };
        assert!(blank.build_predicate().is_match_all());
    }

    #[test]
    fn filter_binds_from_query_names() {
        let f: ProjectFilter = serde_json::from_str(r#"{"customer":"Acme","minBudget":100}"#).unwrap();
        assert_eq!(f.customer.as_deref(), Some("Acme"));
        assert_eq!(f.min_budget, Some(100));
        let spec = ProjectSpec { filter: f, ..Default::default() };
        assert!(!spec.build_predicate().is_match_all());
    }

    #[tokio::test]
    async fn project_crud_service() -> anyhow::Result<()> {
        let svc = service().await?;
        let p = svc.create(new_project("Plant upgrade", "Acme", 500)).await?;
        assert_eq!(svc.get(p.id).await?.name, "Plant upgrade");

        let changes = ProjectChanges { status: Some("Active".into()), budget: Some(750), ..Default::default() };
        let updated = svc.update(p.id, changes).await?;
        assert_eq!(updated.status, project::status::ACTIVE);
        assert_eq!(svc.get(p.id).await?.budget, 750);

        svc.delete(p.id).await?;
        assert!(matches!(svc.get(p.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_invalid_input() -> anyhow::Result<()> {
        let svc = service().await?;
        assert!(matches!(svc.create(new_project(" ", "Acme", 1)).await, Err(ServiceError::Validation(_))));
        assert!(matches!(svc.create(new_project("X", "Acme", -1)).await, Err(ServiceError::Validation(_))));

        let p = svc.create(new_project("X", "Acme", 1)).await?;
        let bad = ProjectChanges { status: Some("archived".into()), ..Default::default() };
        assert!(matches!(svc.update(p.id, bad).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_sorts_and_pages() -> anyhow::Result<()> {
        let svc = service().await?;
        for i in 0..12 {
            let customer = if i % 3 == 0 { "Globex" } else { "Acme" };
            svc.create(new_project(&format!("P{i:02}"), customer, i * 100)).await?;
        }

        let spec = ProjectSpec {
            page: PageParams::new(0, 1000).sorted_by("name", SortDirection::Ascending),
            filter: ProjectFilter::default(),
        };
        let page = svc.list(spec).await?;
        assert_eq!(page.total_count, 12);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].name, "P00");

        let spec = ProjectSpec {
            page: PageParams::new(1, 10).sorted_by("amount", SortDirection::Descending),
            filter: ProjectFilter { customer: Some("Globex".into()), ..Default::default() },
        };
        let page = svc.list(spec).await?;
        assert_eq!(page.total_count, 4);
        let budgets: Vec<_> = page.items.iter().map(|p| p.budget).collect();
        assert_eq!(budgets, [900, 600, 300, 0]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_sort_column_is_a_client_error() -> anyhow::Result<()> {
        let svc = service().await?;
        let spec = ProjectSpec {
            page: PageParams::default().sorted_by("secret", SortDirection::Ascending),
            filter: ProjectFilter::default(),
        };
        let err = svc.list(spec).await.unwrap_err();
        assert!(err.is_client_error());
        Ok(())
    }
}
