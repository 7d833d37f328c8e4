use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use crate::store::StateStore;
use crate::store::StoreResult;

struct Cached {
    value: Option<String>,
    expires_at: Instant,
}

/// Short-TTL read-through cache fronting `player_game:*` reads (spec §4.6),
/// absorbing read storms from broadcast fan-out. Every write through this
/// wrapper invalidates its own cache entry first, so the cache is
/// correctness-transparent (spec §9) — it can only ever make a read
/// *stale by at most `ttb_core::CACHE_TTL_SECS`*, never wrong after a write
/// that went through `CachedStore` itself.
pub struct CachedStore<S: StateStore> {
    inner: Arc<S>,
    ttl: Duration,
    entries: DashMap<String, Cached>,
}

impl<S: StateStore> CachedStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self::with_ttl(inner, Duration::from_secs(ttb_core::CACHE_TTL_SECS))
    }

    pub fn with_ttl(inner: Arc<S>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[async_trait]
impl<S: StateStore> StateStore for CachedStore<S> {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if let Some(entry) = self.entries.get(key) {
            if Instant::now() < entry.expires_at {
                return Ok(entry.value.clone());
            }
        }
        let value = self.inner.get(key).await?;
        self.entries.insert(
            key.to_string(),
            Cached {
                value: value.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> StoreResult<()> {
        self.invalidate(key);
        self.inner.set(key, value, ttl_secs).await
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.invalidate(key);
        self.inner.del(key).await
    }

    async fn sadd(&self, set_key: &str, member: &str) -> StoreResult<()> {
        self.inner.sadd(set_key, member).await
    }

    async fn srem(&self, set_key: &str, member: &str) -> StoreResult<()> {
        self.inner.srem(set_key, member).await
    }

    async fn smembers(&self, set_key: &str) -> StoreResult<Vec<String>> {
        self.inner.smembers(set_key).await
    }

    async fn hset(&self, key: &str, map: HashMap<String, String>) -> StoreResult<()> {
        self.inner.hset(key, map).await
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        self.inner.hgetall(key).await
    }

    async fn publish(&self, channel: &str, message: &str) -> StoreResult<()> {
        self.inner.publish(channel, message).await
    }

    async fn subscribe(
        &self,
        pattern: &str,
        handler: Box<dyn Fn(String, String) + Send + Sync + 'static>,
    ) -> StoreResult<()> {
        self.inner.subscribe(pattern, handler).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn read_is_served_from_cache_within_ttl() {
        let inner = Arc::new(MemoryStore::new());
        inner.set("player_game:1", "v1", None).await.unwrap();
        let cached = CachedStore::with_ttl(inner.clone(), Duration::from_secs(60));

        assert_eq!(cached.get("player_game:1").await.unwrap(), Some("v1".to_string()));
        // mutate the backing store directly, bypassing the cache wrapper
        inner.set("player_game:1", "v2", None).await.unwrap();
        // still served stale from cache
        assert_eq!(cached.get("player_game:1").await.unwrap(), Some("v1".to_string()));
    }

    #[tokio::test]
    async fn write_through_cache_invalidates_immediately() {
        let inner = Arc::new(MemoryStore::new());
        let cached = CachedStore::with_ttl(inner.clone(), Duration::from_secs(60));
        cached.set("player_game:1", "v1", None).await.unwrap();
        assert_eq!(cached.get("player_game:1").await.unwrap(), Some("v1".to_string()));
        cached.set("player_game:1", "v2", None).await.unwrap();
        assert_eq!(cached.get("player_game:1").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn expired_entry_is_refetched() {
        let inner = Arc::new(MemoryStore::new());
        inner.set("player_game:1", "v1", None).await.unwrap();
        let cached = CachedStore::with_ttl(inner.clone(), Duration::from_millis(1));
        cached.get("player_game:1").await.unwrap();
        inner.set("player_game:1", "v2", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cached.get("player_game:1").await.unwrap(), Some("v2".to_string()));
    }
}
