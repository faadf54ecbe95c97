use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use sea_orm::{DatabaseConnection, IntoActiveModel};
use tracing::{debug, instrument};

use super::error::RepositoryResult;
use super::session::Session;
use super::sort::Sortable;
use super::store::EntityStore;

/// Groups the stores of one logical operation around a single session.
///
/// Stores are created lazily on first request and cached per entity type for
/// the lifetime of the unit of work. Writes staged through any of them are
/// flushed together by [`save_changes`](Self::save_changes) or
/// [`commit_transaction`](Self::commit_transaction).
pub struct UnitOfWork {
    session: Arc<Session>,
    stores: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl UnitOfWork {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { session: Arc::new(Session::new(conn)), stores: DashMap::new() }
    }

    /// Store for `E`; the same `Arc` is returned for every call.
    pub fn repository<E>(&self) -> Arc<EntityStore<E>>
    where
        E: Sortable,
        E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    {
        let entry = self
            .stores
            .entry(TypeId::of::<E>())
            .or_insert_with(|| {
                debug!(entity = std::any::type_name::<E>(), "store created");
                Arc::new(EntityStore::<E>::new(self.session.clone())) as Arc<dyn Any + Send + Sync>
            })
            .clone();
        match entry.downcast::<EntityStore<E>>() {
            Ok(store) => store,
            Err(_) => unreachable!("store registry keyed by TypeId holds a mismatched type"),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn in_transaction(&self) -> bool {
        self.session.in_transaction().await
    }

    pub async fn pending_changes(&self) -> usize {
        self.session.pending_len().await
    }

    #[instrument(skip(self))]
    pub async fn save_changes(&self) -> RepositoryResult<u64> {
        Ok(self.session.flush().await?)
    }

    /// Idempotent: a second call while a transaction is open reuses it.
    #[instrument(skip(self))]
    pub async fn begin_transaction(&self) -> RepositoryResult<()> {
        if !self.session.begin().await? {
            debug!("transaction already open; reusing it");
        }
        Ok(())
    }

    /// Flush staged writes, then commit. Without an open transaction only the
    /// flush happens.
    #[instrument(skip(self))]
    pub async fn commit_transaction(&self) -> RepositoryResult<()> {
        self.session.flush().await?;
        if !self.session.commit().await? {
            debug!("commit without an open transaction");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn rollback_transaction(&self) -> RepositoryResult<()> {
        if !self.session.rollback().await? {
            debug!("rollback without an open transaction");
        }
        Ok(())
    }
}
