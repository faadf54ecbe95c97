//! Cache-aside decorator over any [`Repository`].
//!
//! Reads consult the cache first and fill it on a miss; writes go to the
//! wrapped repository first and then invalidate the identity entry. A write
//! that is already committed refills the entry. A staged write, or any write
//! inside an open transaction, leaves the entry empty and registers it with
//! the session, which evicts it again once the write commits or is discarded.
//! Nothing is filled while a transaction is open, so uncommitted rows never
//! reach the shared cache.
//!
//! Cache failures never surface to callers: reads fall through to the store,
//! writes log and move on. Query-shaped entries (`first`/`single`) are not
//! invalidated by writes and live for `query_ttl`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::sea_query::FromValueTuple;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Select};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{trace, warn};

use models::set_all;

use crate::cache::CacheBackend;

use super::error::RepositoryResult;
use super::predicate::Predicate;
use super::session::Session;
use super::sort::SortInstruction;
use super::traits::{KeyOf, Page, Repository};

/// Time-to-live for identity entries and for predicate-keyed entries.
/// `None` keeps an entry until the backend evicts it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    pub entity_ttl: Option<Duration>,
    pub query_ttl: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { entity_ttl: Some(Duration::from_secs(300)), query_ttl: Some(Duration::from_secs(60)) }
    }
}

fn ttl(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl From<&configs::CacheConfig> for CachePolicy {
    fn from(cfg: &configs::CacheConfig) -> Self {
        Self { entity_ttl: ttl(cfg.entity_ttl_secs), query_ttl: ttl(cfg.query_ttl_secs) }
    }
}

pub struct CachedRepository<E: EntityTrait> {
    inner: Arc<dyn Repository<E>>,
    session: Arc<Session>,
    cache: Arc<dyn CacheBackend>,
    policy: CachePolicy,
    table: String,
}

impl<E> CachedRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + DeserializeOwned + Sync,
    KeyOf<E>: fmt::Debug,
{
    /// `session` must be the session `inner` writes through.
    pub fn new(
        inner: Arc<dyn Repository<E>>,
        session: Arc<Session>,
        cache: Arc<dyn CacheBackend>,
        policy: CachePolicy,
    ) -> Self {
        Self { inner, session, cache, policy, table: E::default().table_name().to_string() }
    }

    pub fn identity_key(&self, key: &KeyOf<E>) -> String {
        format!("{}:key:{:?}", self.table, key)
    }

    fn query_key(&self, kind: &str, predicate: &Predicate<E>) -> String {
        format!("{}:{}:{}", self.table, kind, predicate.fingerprint())
    }

    fn model_key(&self, model: &E::Model) -> Option<String> {
        let am: E::ActiveModel = set_all(model.clone());
        let values = am.get_primary_key_value()?;
        Some(self.identity_key(&<KeyOf<E> as FromValueTuple>::from_value_tuple(values)))
    }

    async fn read(&self, key: &str) -> Option<E::Model> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(model) => {
                    trace!(key, "cache hit");
                    Some(model)
                }
                Err(err) => {
                    warn!(key, error = %err, "corrupt cache entry; evicting");
                    self.evict(key).await;
                    None
                }
            },
            Ok(None) => {
                trace!(key, "cache miss");
                None
            }
            Err(err) => {
                warn!(key, error = %err, "cache read failed; falling back to store");
                None
            }
        }
    }

    async fn fill(&self, key: &str, model: &E::Model, ttl: Option<Duration>) {
        if self.session.in_transaction().await {
            trace!(key, "transaction open; not caching");
            return;
        }
        let bytes = match serde_json::to_vec(model) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key, error = %err, "cannot serialize model for cache");
                return;
            }
        };
        if let Err(err) = self.cache.set(key, bytes, ttl).await {
            warn!(key, error = %err, "cache write failed");
        }
    }

    async fn evict(&self, key: &str) {
        if let Err(err) = self.cache.delete(key).await {
            warn!(key, error = %err, "cache delete failed");
        }
    }

    /// Invalidate the identity entry of a written model. A committed write
    /// refills it with `fresh`; otherwise the session evicts it again once
    /// the write settles.
    async fn after_write(&self, key: Option<String>, fresh: Option<&E::Model>, flushed: bool) {
        let Some(key) = key else {
            return;
        };
        self.evict(&key).await;
        if !flushed || self.session.in_transaction().await {
            self.session.evict_when_settled(self.cache.clone(), key).await;
            return;
        }
        if let Some(model) = fresh {
            self.fill(&key, model, self.policy.entity_ttl).await;
        }
    }

    async fn cached_query<F>(&self, key: String, load: F) -> RepositoryResult<Option<E::Model>>
    where
        F: std::future::Future<Output = RepositoryResult<Option<E::Model>>> + Send,
    {
        if let Some(hit) = self.read(&key).await {
            return Ok(Some(hit));
        }
        let found = load.await?;
        if let Some(model) = &found {
            self.fill(&key, model, self.policy.query_ttl).await;
        }
        Ok(found)
    }
}

#[async_trait]
impl<E> Repository<E> for CachedRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + DeserializeOwned + Sync,
    KeyOf<E>: fmt::Debug,
{
    fn query(&self) -> Select<E> {
        self.inner.query()
    }

    fn query_where(&self, predicate: Predicate<E>) -> Select<E> {
        self.inner.query_where(predicate)
    }

    async fn fetch_all(&self, select: Select<E>) -> RepositoryResult<Vec<E::Model>> {
        self.inner.fetch_all(select).await
    }

    async fn count_where(&self, predicate: Predicate<E>) -> RepositoryResult<u64> {
        self.inner.count_where(predicate).await
    }

    async fn find_by_key(&self, key: KeyOf<E>) -> RepositoryResult<Option<E::Model>> {
        let cache_key = self.identity_key(&key);
        if let Some(hit) = self.read(&cache_key).await {
            return Ok(Some(hit));
        }
        let found = self.inner.find_by_key(key).await?;
        if let Some(model) = &found {
            self.fill(&cache_key, model, self.policy.entity_ttl).await;
        }
        Ok(found)
    }

    async fn first_matching(&self, predicate: Predicate<E>) -> RepositoryResult<Option<E::Model>> {
        let key = self.query_key("first", &predicate);
        self.cached_query(key, self.inner.first_matching(predicate)).await
    }

    async fn single_matching(&self, predicate: Predicate<E>) -> RepositoryResult<Option<E::Model>> {
        let key = self.query_key("single", &predicate);
        self.cached_query(key, self.inner.single_matching(predicate)).await
    }

    async fn add(&self, entity: E::Model, auto_flush: bool) -> RepositoryResult<E::Model> {
        let saved = self.inner.add(entity, auto_flush).await?;
        self.after_write(self.model_key(&saved), Some(&saved), auto_flush).await;
        Ok(saved)
    }

    async fn update(&self, entity: E::Model, auto_flush: bool) -> RepositoryResult<E::Model> {
        let saved = self.inner.update(entity, auto_flush).await?;
        self.after_write(self.model_key(&saved), Some(&saved), auto_flush).await;
        Ok(saved)
    }

    async fn remove(&self, entity: E::Model, auto_flush: bool) -> RepositoryResult<()> {
        let key = self.model_key(&entity);
        self.inner.remove(entity, auto_flush).await?;
        self.after_write(key, None, auto_flush).await;
        Ok(())
    }

    async fn page_with_count(
        &self,
        predicate: Predicate<E>,
        sort: Option<SortInstruction>,
        page_number: u64,
        page_size: u64,
    ) -> RepositoryResult<Page<E::Model>> {
        self.inner.page_with_count(predicate, sort, page_number, page_size).await
    }

    async fn save_changes(&self) -> RepositoryResult<u64> {
        self.inner.save_changes().await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::ColumnTrait;

    use models::{contract, project};

    use crate::cache::{CacheError, MokaCacheBackend};
    use crate::repository::UnitOfWork;
    use crate::test_support::memory_db;

    use super::*;

    struct FailingBackend;

    #[async_trait]
    impl CacheBackend for FailingBackend {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Option<Duration>) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }
    }

    fn cached<E>(uow: &UnitOfWork, cache: Arc<dyn CacheBackend>) -> CachedRepository<E>
    where
        E: crate::repository::Sortable,
        E::Model: IntoActiveModel<E::ActiveModel> + Serialize + DeserializeOwned + Sync,
        KeyOf<E>: fmt::Debug,
    {
        CachedRepository::new(uow.repository::<E>(), uow.session().clone(), cache, CachePolicy::default())
    }

    #[tokio::test]
    async fn read_after_update_sees_new_state() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());

        let p = projects.add(project::Model::new("Depot", "Acme", 10), true).await?;
        assert_eq!(projects.find_by_key(p.id).await?.map(|m| m.budget), Some(10));

        let mut changed = p.clone();
        changed.budget = 25;
        projects.update(changed, true).await?;
        assert_eq!(projects.find_by_key(p.id).await?.map(|m| m.budget), Some(25));
        Ok(())
    }

    #[tokio::test]
    async fn staged_update_only_invalidates() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());

        let p = projects.add(project::Model::new("Depot", "Acme", 10), true).await?;
        let key = projects.identity_key(&p.id);
        assert!(backend.get(&key).await?.is_some());

        let mut changed = p.clone();
        changed.budget = 30;
        projects.update(changed, false).await?;
        assert!(backend.get(&key).await?.is_none());

        projects.save_changes().await?;
        assert_eq!(projects.find_by_key(p.id).await?.map(|m| m.budget), Some(30));
        Ok(())
    }

    #[tokio::test]
    async fn read_between_staging_and_save_does_not_pin_old_row() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());

        let p = projects.add(project::Model::new("Depot", "Acme", 10), true).await?;
        let mut changed = p.clone();
        changed.budget = 99;
        projects.update(changed, false).await?;
        assert_eq!(uow.session().stale_len().await, 1);

        // the store still holds the old row, and the read caches it
        assert_eq!(projects.find_by_key(p.id).await?.map(|m| m.budget), Some(10));
        assert!(backend.get(&projects.identity_key(&p.id)).await?.is_some());

        projects.save_changes().await?;
        assert_eq!(uow.session().stale_len().await, 0);
        assert!(backend.get(&projects.identity_key(&p.id)).await?.is_none());
        assert_eq!(projects.find_by_key(p.id).await?.map(|m| m.budget), Some(99));
        Ok(())
    }

    #[tokio::test]
    async fn rolled_back_add_is_not_served_from_cache() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());

        uow.begin_transaction().await?;
        let p = projects.add(project::Model::new("Ghost", "Acme", 1), true).await?;
        // visible inside the transaction, but never cached
        assert_eq!(projects.find_by_key(p.id).await?.map(|m| m.name).as_deref(), Some("Ghost"));
        assert!(backend.get(&projects.identity_key(&p.id)).await?.is_none());
        uow.rollback_transaction().await?;

        assert!(backend.get(&projects.identity_key(&p.id)).await?.is_none());
        assert!(projects.find_by_key(p.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn committed_update_replaces_cached_row() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());

        let p = projects.add(project::Model::new("Depot", "Acme", 10), true).await?;
        let key = projects.identity_key(&p.id);
        assert!(backend.get(&key).await?.is_some());

        uow.begin_transaction().await?;
        let mut changed = p.clone();
        changed.budget = 42;
        projects.update(changed, true).await?;
        assert!(backend.get(&key).await?.is_none());
        uow.commit_transaction().await?;

        assert!(backend.get(&key).await?.is_none());
        assert_eq!(projects.find_by_key(p.id).await?.map(|m| m.budget), Some(42));
        assert!(backend.get(&key).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn different_ids_of_one_entity_do_not_collide() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());

        let a = projects.add(project::Model::new("Alpha", "Acme", 1), true).await?;
        let b = projects.add(project::Model::new("Beta", "Acme", 2), true).await?;
        assert_eq!(projects.find_by_key(a.id).await?.map(|m| m.name).as_deref(), Some("Alpha"));

        assert_ne!(projects.identity_key(&a.id), projects.identity_key(&b.id));
        assert_eq!(projects.find_by_key(b.id).await?.map(|m| m.name).as_deref(), Some("Beta"));
        assert_eq!(projects.find_by_key(a.id).await?.map(|m| m.name).as_deref(), Some("Alpha"));
        Ok(())
    }

    #[tokio::test]
    async fn entities_do_not_share_cache_entries() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend: Arc<dyn CacheBackend> = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());
        let contracts = cached::<contract::Entity>(&uow, backend.clone());

        let p = projects.add(project::Model::new("Depot", "Acme", 10), true).await?;
        // same id on purpose
        let mut c = contract::Model::signed(p.id, None, "C-7", 10);
        c.id = p.id;
        contracts.add(c.clone(), true).await?;

        assert_ne!(projects.identity_key(&p.id), contracts.identity_key(&c.id));
        assert_eq!(projects.find_by_key(p.id).await?.map(|m| m.name).as_deref(), Some("Depot"));
        assert_eq!(contracts.find_by_key(c.id).await?.map(|m| m.number).as_deref(), Some("C-7"));
        Ok(())
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_store() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let projects = cached::<project::Entity>(&uow, Arc::new(FailingBackend));

        let p = projects.add(project::Model::new("Depot", "Acme", 10), true).await?;
        assert!(projects.find_by_key(p.id).await?.is_some());
        let first = projects.first_matching(Predicate::when(project::Column::Name.eq("Depot"))).await?;
        assert_eq!(first.map(|m| m.id), Some(p.id));
        projects.remove(p.clone(), true).await?;
        assert!(projects.find_by_key(p.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_entry_is_treated_as_miss() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());

        let p = projects.add(project::Model::new("Depot", "Acme", 10), true).await?;
        let key = projects.identity_key(&p.id);
        backend.set(&key, b"not json".to_vec(), None).await?;

        assert_eq!(projects.find_by_key(p.id).await?.map(|m| m.id), Some(p.id));
        let refilled = backend.get(&key).await?.expect("refilled");
        assert!(serde_json::from_slice::<project::Model>(&refilled).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn remove_evicts_identity_entry() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());

        let p = projects.add(project::Model::new("Depot", "Acme", 10), true).await?;
        projects.remove(p.clone(), true).await?;
        assert!(backend.get(&projects.identity_key(&p.id)).await?.is_none());
        assert!(projects.find_by_key(p.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn query_entries_are_keyed_by_predicate() -> anyhow::Result<()> {
        let uow = UnitOfWork::new(memory_db().await?);
        let backend = Arc::new(MokaCacheBackend::new(100));
        let projects = cached::<project::Entity>(&uow, backend.clone());
        projects.add(project::Model::new("North", "Acme", 1), true).await?;
        projects.add(project::Model::new("South", "Acme", 2), true).await?;

        let north = projects.single_matching(Predicate::when(project::Column::Name.eq("North"))).await?;
        let south = projects.single_matching(Predicate::when(project::Column::Name.eq("South"))).await?;
        assert_eq!(north.map(|m| m.name).as_deref(), Some("North"));
        assert_eq!(south.map(|m| m.name).as_deref(), Some("South"));

        let key = format!("project:single:{}", Predicate::<project::Entity>::when(project::Column::Name.eq("North")).fingerprint());
        assert!(backend.get(&key).await?.is_some());
        Ok(())
    }
}
