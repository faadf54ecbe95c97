//! Backing session shared by every store of one unit of work.
//!
//! Owns the database connection, the (at most one) open transaction and the
//! queue of staged write statements. Reads and flushes run on the open
//! transaction when there is one, otherwise on the pooled connection.
//!
//! Cache entries invalidated by a write that has not settled yet (staged, or
//! flushed inside an open transaction) are remembered here and evicted again
//! once the write is committed or discarded.

use std::sync::Arc;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, EntityTrait,
    PaginatorTrait, Select, Statement, TransactionTrait,
};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::cache::CacheBackend;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A write that has been staged but not yet sent to the database.
#[derive(Debug)]
pub(crate) struct PendingChange {
    pub entity: String,
    pub kind: ChangeKind,
    pub statement: Statement,
}

/// A cache entry to drop once the session's writes settle.
struct StaleEntry {
    cache: Arc<dyn CacheBackend>,
    key: String,
}

pub struct Session {
    conn: DatabaseConnection,
    txn: Mutex<Option<DatabaseTransaction>>,
    pending: Mutex<Vec<PendingChange>>,
    stale: Mutex<Vec<StaleEntry>>,
}

/// Run `$body` with `$conn` bound to the open transaction, or to the plain
/// connection when none is open. The transaction slot stays locked for the
/// duration of the call.
macro_rules! with_executor {
    ($session:ident, $conn:ident => $body:expr) => {{
        let guard = $session.txn.lock().await;
        match guard.as_ref() {
            Some($conn) => $body,
            None => {
                let $conn = &$session.conn;
                $body
            }
        }
    }};
}

impl Session {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn, txn: Mutex::new(None), pending: Mutex::new(Vec::new()), stale: Mutex::new(Vec::new()) }
    }

    pub fn backend(&self) -> DbBackend {
        self.conn.get_database_backend()
    }

    pub async fn fetch_all<E: EntityTrait>(&self, select: Select<E>) -> Result<Vec<E::Model>, DbErr> {
        with_executor!(self, conn => select.all(conn).await)
    }

    pub async fn fetch_one<E: EntityTrait>(&self, select: Select<E>) -> Result<Option<E::Model>, DbErr> {
        with_executor!(self, conn => select.one(conn).await)
    }

    pub async fn count<E>(&self, select: Select<E>) -> Result<u64, DbErr>
    where
        E: EntityTrait,
        E::Model: Sync,
    {
        with_executor!(self, conn => select.count(conn).await)
    }

    pub(crate) async fn stage(&self, change: PendingChange) {
        trace!(entity = %change.entity, kind = ?change.kind, "change staged");
        self.pending.lock().await.push(change);
    }

    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn in_transaction(&self) -> bool {
        self.txn.lock().await.is_some()
    }

    /// Evict `key` from `cache` again after the next flush outside a
    /// transaction, commit or rollback.
    pub(crate) async fn evict_when_settled(&self, cache: Arc<dyn CacheBackend>, key: String) {
        let mut stale = self.stale.lock().await;
        if !stale.iter().any(|e| e.key == key && Arc::ptr_eq(&e.cache, &cache)) {
            stale.push(StaleEntry { cache, key });
        }
    }

    #[cfg(test)]
    pub(crate) async fn stale_len(&self) -> usize {
        self.stale.lock().await.len()
    }

    async fn evict_stale(&self) {
        let entries = std::mem::take(&mut *self.stale.lock().await);
        if entries.is_empty() {
            return;
        }
        let count = entries.len();
        for entry in entries {
            if let Err(err) = entry.cache.delete(&entry.key).await {
                warn!(key = %entry.key, error = %err, "deferred cache eviction failed");
            }
        }
        trace!(evicted = count, "stale cache entries evicted");
    }

    /// Execute every staged statement in order and return the total rows
    /// affected. Without an open transaction the batch runs inside a
    /// short-lived one so it applies atomically.
    pub async fn flush(&self) -> Result<u64, DbErr> {
        let changes = std::mem::take(&mut *self.pending.lock().await);
        let count = changes.len();
        let guard = self.txn.lock().await;
        let in_transaction = guard.is_some();
        let result = match guard.as_ref() {
            _ if changes.is_empty() => Ok(0),
            Some(txn) => execute_all(txn, changes).await,
            None => self.execute_committed(changes).await,
        };
        drop(guard);
        // inside a transaction the rows are not visible to others until commit
        if !in_transaction {
            self.evict_stale().await;
        }
        let affected = result?;
        if count > 0 {
            debug!(statements = count, rows = affected, in_transaction, "session flushed");
        }
        Ok(affected)
    }

    async fn execute_committed(&self, changes: Vec<PendingChange>) -> Result<u64, DbErr> {
        let txn = self.conn.begin().await?;
        let affected = execute_all(&txn, changes).await?;
        txn.commit().await?;
        Ok(affected)
    }

    /// Open a transaction unless one is already active. Returns whether a new
    /// one was started.
    pub async fn begin(&self) -> Result<bool, DbErr> {
        let mut guard = self.txn.lock().await;
        if guard.is_some() {
            return Ok(false);
        }
        *guard = Some(self.conn.begin().await?);
        Ok(true)
    }

    /// Commit the active transaction; `false` when there was none. Staged
    /// changes are not flushed here.
    pub async fn commit(&self) -> Result<bool, DbErr> {
        let txn = self.txn.lock().await.take();
        match txn {
            Some(txn) => {
                let result = txn.commit().await;
                self.evict_stale().await;
                result?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Roll back the active transaction and drop staged changes; `false` and
    /// untouched state when there was none.
    pub async fn rollback(&self) -> Result<bool, DbErr> {
        let txn = self.txn.lock().await.take();
        match txn {
            Some(txn) => {
                let discarded = {
                    let mut pending = self.pending.lock().await;
                    let n = pending.len();
                    pending.clear();
                    n
                };
                let result = txn.rollback().await;
                self.evict_stale().await;
                result?;
                debug!(discarded, "transaction rolled back");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

async fn execute_all<C: ConnectionTrait>(conn: &C, changes: Vec<PendingChange>) -> Result<u64, DbErr> {
    let mut affected = 0;
    for change in changes {
        let res = conn.execute(change.statement).await?;
        trace!(entity = %change.entity, kind = ?change.kind, rows = res.rows_affected(), "statement executed");
        affected += res.rows_affected();
    }
    Ok(affected)
}

impl Drop for Session {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().len();
        if pending > 0 {
            warn!(pending, "session dropped with unflushed changes; they are discarded");
        }
        if self.txn.get_mut().is_some() {
            warn!("session dropped with an open transaction; it will be rolled back");
        }
    }
}
