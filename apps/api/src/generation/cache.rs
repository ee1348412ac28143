//! Caches the full option list of the last generation per listing.
//!
//! `AppState` holds an `Arc<dyn DescriptionCache>`:
//! `RedisDescriptionCache` when REDIS_URL is set, `InMemoryDescriptionCache` otherwise.
//! No cross-request locking: concurrent regenerations are last-writer-wins.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::generation::generator::GenerationResult;

/// 24 hours.
pub const DESCRIPTION_CACHE_TTL_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache payload error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Key under which a listing's generated options are stored.
pub fn cache_key(listing_id: Uuid) -> String {
    format!("listing-descriptions:{listing_id}")
}

#[async_trait]
pub trait DescriptionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<GenerationResult>>, CacheError>;

    async fn put(
        &self,
        key: &str,
        results: &[GenerationResult],
        ttl_secs: u64,
    ) -> Result<(), CacheError>;

    async fn has(&self, key: &str) -> Result<bool, CacheError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Redis backend
// ────────────────────────────────────────────────────────────────────────────

/// Stores each option list as a JSON string with `SET EX`.
///
/// Holds one `ConnectionManager` opened at startup; every operation works on a
/// clone of it, so all calls share the same multiplexed connection.
#[derive(Clone)]
pub struct RedisDescriptionCache {
    conn: ConnectionManager,
}

impl RedisDescriptionCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Opens the connection and checks it with a PING, so a bad REDIS_URL
    /// fails at startup.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Redis PING: {pong}");
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl DescriptionCache for RedisDescriptionCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<GenerationResult>>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(CacheError::from)
    }

    async fn put(
        &self,
        key: &str,
        results: &[GenerationResult],
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let json = serde_json::to_string(results)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, json, ttl_secs).await?;
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-process backend
// ────────────────────────────────────────────────────────────────────────────

struct CachedEntry {
    results: Vec<GenerationResult>,
    expires_at: Instant,
}

/// Process-local TTL map. Expired entries are evicted when touched.
#[derive(Default)]
pub struct InMemoryDescriptionCache {
    entries: Mutex<HashMap<String, CachedEntry>>,
}

impl InMemoryDescriptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_entry<T>(
        &self,
        key: &str,
        read: impl FnOnce(&CachedEntry) -> T,
    ) -> Result<Option<T>, CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(read(entry))),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DescriptionCache for InMemoryDescriptionCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<GenerationResult>>, CacheError> {
        self.live_entry(key, |entry| entry.results.clone())
    }

    async fn put(
        &self,
        key: &str,
        results: &[GenerationResult],
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.insert(
            key.to_string(),
            CachedEntry {
                results: results.to_vec(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.live_entry(key, |_| ())?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<GenerationResult> {
        vec![
            GenerationResult {
                description: "Spacious House in Lagos.".to_string(),
                seo_score: 62,
            },
            GenerationResult {
                description: "Modern House in Lagos.".to_string(),
                seo_score: 64,
            },
        ]
    }

    #[test]
    fn test_cache_key_format() {
        let id = Uuid::parse_str("7f1c6c1e-0d55-4a43-9d1c-0f3b1d8a9e01").unwrap();
        assert_eq!(
            cache_key(id),
            "listing-descriptions:7f1c6c1e-0d55-4a43-9d1c-0f3b1d8a9e01"
        );
    }

    #[tokio::test]
    async fn test_in_memory_put_get_has() {
        let cache = InMemoryDescriptionCache::new();
        assert!(!cache.has("k").await.unwrap());
        assert!(cache.get("k").await.unwrap().is_none());

        cache.put("k", &results(), DESCRIPTION_CACHE_TTL_SECS).await.unwrap();

        assert!(cache.has("k").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), Some(results()));
    }

    #[tokio::test]
    async fn test_in_memory_put_overwrites() {
        let cache = InMemoryDescriptionCache::new();
        cache.put("k", &results(), 60).await.unwrap();
        let replacement = vec![GenerationResult {
            description: "Only one".to_string(),
            seo_score: 60,
        }];
        cache.put("k", &replacement, 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn test_redis_connect_rejects_malformed_url_up_front() {
        let err = RedisDescriptionCache::connect("not a redis url")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CacheError::Redis(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_memory_entries_expire() {
        let cache = InMemoryDescriptionCache::new();
        cache.put("k", &results(), DESCRIPTION_CACHE_TTL_SECS).await.unwrap();

        tokio::time::advance(Duration::from_secs(DESCRIPTION_CACHE_TTL_SECS - 1)).await;
        assert!(cache.has("k").await.unwrap());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!cache.has("k").await.unwrap());
        assert!(cache.get("k").await.unwrap().is_none());
    }
}
