use std::sync::Arc;

use sea_orm::{DatabaseConnection, IntoActiveModel};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{CacheBackend, MokaCacheBackend};
use crate::pagination::PageLimits;
use crate::repository::{CachePolicy, CachedRepository, KeyOf, Repository, Sortable, UnitOfWork};

/// Shared dependencies of the business services.
///
/// Cheap to clone. Each service call opens its own [`UnitOfWork`]; stores
/// handed out by [`repository`](Self::repository) are wrapped in the
/// cache-aside decorator when a cache backend is configured.
#[derive(Clone)]
pub struct ServiceContext {
    db: DatabaseConnection,
    cache: Option<Arc<dyn CacheBackend>>,
    policy: CachePolicy,
    limits: PageLimits,
}

impl ServiceContext {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None, policy: CachePolicy::default(), limits: PageLimits::default() }
    }

    /// Context configured from the `[cache]` and `[pagination]` sections.
    pub fn from_config(db: DatabaseConnection, cfg: &configs::AppConfig) -> Self {
        let ctx = Self::new(db).with_limits(PageLimits::from(&cfg.pagination));
        if cfg.cache.enabled {
            ctx.with_cache(Arc::new(MokaCacheBackend::from_config(&cfg.cache)), CachePolicy::from(&cfg.cache))
        } else {
            ctx
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>, policy: CachePolicy) -> Self {
        self.cache = Some(cache);
        self.policy = policy;
        self
    }

    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    pub fn caching(&self) -> bool {
        self.cache.is_some()
    }

    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(self.db.clone())
    }

    /// Store for `E` from `uow`, behind the cache when one is configured.
    pub fn repository<E>(&self, uow: &UnitOfWork) -> Arc<dyn Repository<E>>
    where
        E: Sortable + 'static,
        E::Model: IntoActiveModel<E::ActiveModel> + Serialize + DeserializeOwned + Sync,
        KeyOf<E>: std::fmt::Debug,
    {
        let store: Arc<dyn Repository<E>> = uow.repository::<E>();
        match &self.cache {
            Some(cache) => Arc::new(CachedRepository::new(store, uow.session().clone(), cache.clone(), self.policy)),
            None => store,
        }
    }
}

/// Trimmed value of an optional text filter; blank counts as unset.
pub(crate) fn text_filter(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
