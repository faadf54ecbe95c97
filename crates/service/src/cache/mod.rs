//! Byte-oriented cache backends used by the cache-aside repository decorator.
//!
//! Values are opaque bytes (JSON from the decorator). Every call is fallible
//! so remote backends fit the same trait; the in-process moka backend never
//! fails.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    /// `ttl = None` keeps the entry until evicted.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Clone)]
struct Entry {
    bytes: Vec<u8>,
    ttl: Option<Duration>,
}

/// Expiry driven by the TTL stored with each entry.
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-process backend on a moka future cache, bounded by entry count.
#[derive(Clone)]
pub struct MokaCacheBackend {
    inner: Cache<String, Entry>,
}

impl MokaCacheBackend {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder().max_capacity(max_capacity).expire_after(EntryTtl).build();
        Self { inner }
    }

    pub fn from_config(cfg: &configs::CacheConfig) -> Self {
        Self::new(cfg.max_capacity)
    }
}

#[async_trait]
impl CacheBackend for MokaCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.get(key).await.map(|e| e.bytes))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), Entry { bytes: value, ttl }).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let cache = MokaCacheBackend::new(100);
        assert!(cache.get("k").await.unwrap().is_none());
        cache.set("k", b"v".to_vec(), None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some(&b"v"[..]));
        cache.delete("k").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entries_expire_after_their_ttl() {
        let cache = MokaCacheBackend::new(100);
        cache.set("short", b"1".to_vec(), Some(Duration::from_millis(50))).await.unwrap();
        cache.set("long", b"2".to_vec(), None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get("short").await.unwrap().is_none());
        assert!(cache.get("long").await.unwrap().is_some());
    }
}
