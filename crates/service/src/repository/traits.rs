use async_trait::async_trait;
use sea_orm::{EntityTrait, PrimaryKeyTrait, Select};
use serde::Serialize;

use super::error::RepositoryResult;
use super::predicate::Predicate;
use super::sort::SortInstruction;
use super::spec::FilterSortSpec;

/// Primary key value type of an entity (`Uuid` for every table here).
pub type KeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// One page of results plus the total number of matching rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

/// Generic data access for one entity type.
///
/// Writes with `auto_flush == false` are staged and only reach the database
/// on the next [`save_changes`](Self::save_changes) of any store sharing the
/// same unit of work.
#[async_trait]
pub trait Repository<E: EntityTrait>: Send + Sync {
    /// Unfiltered, composable query. Nothing runs until it is passed back
    /// to [`fetch_all`](Self::fetch_all).
    fn query(&self) -> Select<E>;
    fn query_where(&self, predicate: Predicate<E>) -> Select<E>;

    async fn fetch_all(&self, select: Select<E>) -> RepositoryResult<Vec<E::Model>>;
    async fn count_where(&self, predicate: Predicate<E>) -> RepositoryResult<u64>;

    async fn find_by_key(&self, key: KeyOf<E>) -> RepositoryResult<Option<E::Model>>;
    async fn first_matching(&self, predicate: Predicate<E>) -> RepositoryResult<Option<E::Model>>;
    /// Like `first_matching` but fails with `MultipleResults` when more than
    /// one row matches.
    async fn single_matching(&self, predicate: Predicate<E>) -> RepositoryResult<Option<E::Model>>;

    async fn add(&self, entity: E::Model, auto_flush: bool) -> RepositoryResult<E::Model>;
    async fn update(&self, entity: E::Model, auto_flush: bool) -> RepositoryResult<E::Model>;
    async fn remove(&self, entity: E::Model, auto_flush: bool) -> RepositoryResult<()>;

    async fn page_with_count(
        &self,
        predicate: Predicate<E>,
        sort: Option<SortInstruction>,
        page_number: u64,
        page_size: u64,
    ) -> RepositoryResult<Page<E::Model>>;

    async fn page_matching(&self, spec: &dyn FilterSortSpec<E>) -> RepositoryResult<Page<E::Model>> {
        let page = spec.page();
        self.page_with_count(spec.build_predicate(), spec.build_sort(), page.page_number(), page.page_size())
            .await
    }

    /// Flush every staged write of the owning unit of work; returns rows affected.
    async fn save_changes(&self) -> RepositoryResult<u64>;
}
