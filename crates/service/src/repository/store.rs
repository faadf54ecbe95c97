use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, IdenStatic, IntoActiveModel, Iterable, ModelTrait,
    PrimaryKeyToColumn, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Statement,
};
use tracing::debug;

use models::set_all;

use crate::pagination::page_offset;

use super::error::{RepositoryError, RepositoryResult};
use super::predicate::Predicate;
use super::session::{ChangeKind, PendingChange, Session};
use super::sort::{SortColumns, SortInstruction, Sortable};
use super::traits::{KeyOf, Page, Repository};

/// Session-backed repository for one entity type.
///
/// Obtained through [`UnitOfWork::repository`](super::UnitOfWork::repository);
/// every store of a unit of work shares its session, so staged writes from
/// different stores flush together.
pub struct EntityStore<E: EntityTrait> {
    session: Arc<Session>,
    sort_columns: SortColumns<E>,
    table: String,
}

impl<E> EntityStore<E>
where
    E: Sortable,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
{
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self { session, sort_columns: E::sort_columns(), table: E::default().table_name().to_string() }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `pk_1 = v_1 AND ... AND pk_n = v_n` for the model's primary key.
    fn identity_condition(model: &E::Model) -> Condition {
        E::PrimaryKey::iter().fold(Condition::all(), |cond, key| {
            let col = key.into_column();
            cond.add(col.eq(model.get(col)))
        })
    }

    fn statement_for(&self, kind: ChangeKind, model: E::Model) -> Statement {
        let backend = self.session.backend();
        match kind {
            ChangeKind::Insert => E::insert(set_all::<_, E::ActiveModel>(model)).build(backend),
            ChangeKind::Update => {
                let cond = Self::identity_condition(&model);
                E::update_many()
                    .set(set_all::<_, E::ActiveModel>(model))
                    .filter(cond)
                    .build(backend)
            }
            ChangeKind::Delete => E::delete_many()
                .filter(Self::identity_condition(&model))
                .build(backend),
        }
    }

    async fn stage(&self, kind: ChangeKind, model: E::Model, auto_flush: bool) -> RepositoryResult<()> {
        let statement = self.statement_for(kind, model);
        self.session
            .stage(PendingChange { entity: self.table.clone(), kind, statement })
            .await;
        if auto_flush {
            self.session.flush().await?;
        }
        Ok(())
    }

    fn resolve_sort(&self, sort: &SortInstruction) -> RepositoryResult<E::Column> {
        self.sort_columns.resolve(&sort.column).ok_or_else(|| RepositoryError::InvalidSortColumn {
            entity: self.table.to_string(),
            column: sort.column.clone(),
        })
    }
}

#[async_trait]
impl<E> Repository<E> for EntityStore<E>
where
    E: Sortable,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
{
    fn query(&self) -> Select<E> {
        E::find()
    }

    fn query_where(&self, predicate: Predicate<E>) -> Select<E> {
        if predicate.is_match_all() {
            return E::find();
        }
        E::find().filter(predicate.into_condition())
    }

    async fn fetch_all(&self, select: Select<E>) -> RepositoryResult<Vec<E::Model>> {
        Ok(self.session.fetch_all(select).await?)
    }

    async fn count_where(&self, predicate: Predicate<E>) -> RepositoryResult<u64> {
        Ok(self.session.count(self.query_where(predicate)).await?)
    }

    async fn find_by_key(&self, key: KeyOf<E>) -> RepositoryResult<Option<E::Model>> {
        Ok(self.session.fetch_one(E::find_by_id(key)).await?)
    }

    async fn first_matching(&self, predicate: Predicate<E>) -> RepositoryResult<Option<E::Model>> {
        Ok(self.session.fetch_one(self.query_where(predicate)).await?)
    }

    async fn single_matching(&self, predicate: Predicate<E>) -> RepositoryResult<Option<E::Model>> {
        let mut rows = self.session.fetch_all(self.query_where(predicate).limit(2)).await?;
        if rows.len() > 1 {
            return Err(RepositoryError::MultipleResults { entity: self.table.to_string() });
        }
        Ok(rows.pop())
    }

    async fn add(&self, entity: E::Model, auto_flush: bool) -> RepositoryResult<E::Model> {
        self.stage(ChangeKind::Insert, entity.clone(), auto_flush).await?;
        Ok(entity)
    }

    async fn update(&self, entity: E::Model, auto_flush: bool) -> RepositoryResult<E::Model> {
        self.stage(ChangeKind::Update, entity.clone(), auto_flush).await?;
        Ok(entity)
    }

    async fn remove(&self, entity: E::Model, auto_flush: bool) -> RepositoryResult<()> {
        self.stage(ChangeKind::Delete, entity, auto_flush).await
    }

    async fn page_with_count(
        &self,
        predicate: Predicate<E>,
        sort: Option<SortInstruction>,
        page_number: u64,
        page_size: u64,
    ) -> RepositoryResult<Page<E::Model>> {
        // Resolve before touching the database so a bad column fails fast.
        let order = sort
            .as_ref()
            .map(|s| self.resolve_sort(s).map(|col| (col, s.direction.order())))
            .transpose()?;
        let page_number = page_number.max(1);
        let page_size = page_size.max(1);

        let select = self.query_where(predicate);
        let total_count = self.session.count(select.clone()).await?;

        let mut select = select;
        if let Some((column, direction)) = order {
            select = select.order_by(column, direction.clone());
            // Primary key as tie-breaker keeps page boundaries stable.
            for key in E::PrimaryKey::iter() {
                let pk = key.into_column();
                if pk.as_str() != column.as_str() {
                    select = select.order_by(pk, direction.clone());
                }
            }
        }
        // Past the last row there is nothing to fetch, and the offset may not
        // fit the driver's signed integer.
        let offset = page_offset(page_number, page_size);
        let items = if offset >= total_count {
            Vec::new()
        } else {
            let limit = page_size.min(total_count - offset);
            self.session.fetch_all(select.offset(offset).limit(limit)).await?
        };
        debug!(entity = %self.table, page_number, page_size, total_count, returned = items.len(), "page loaded");

        Ok(Page { items, total_count, page_number, page_size })
    }

    async fn save_changes(&self) -> RepositoryResult<u64> {
        Ok(self.session.flush().await?)
    }
}
