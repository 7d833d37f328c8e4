use async_trait::async_trait;
use std::collections::HashMap;

/// Failure of an underlying store operation, surfaced to callers as
/// `ApiError::StoreError` (spec §7).
pub type StoreResult<T> = Result<T, String>;

/// Abstract key-value store contract (spec §4.6): no vendor names leaked,
/// satisfied by both `MemoryStore` (tests, single-process dev) and
/// `RedisStore` (the production backend). TTL is optional per write; a
/// publish is fire-and-forget and a subscription delivers every message
/// matching a glob pattern to one handler for the life of the process.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> StoreResult<()>;
    async fn del(&self, key: &str) -> StoreResult<()>;

    async fn sadd(&self, set_key: &str, member: &str) -> StoreResult<()>;
    async fn srem(&self, set_key: &str, member: &str) -> StoreResult<()>;
    async fn smembers(&self, set_key: &str) -> StoreResult<Vec<String>>;

    async fn hset(&self, key: &str, map: HashMap<String, String>) -> StoreResult<()>;
    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>>;

    async fn publish(&self, channel: &str, message: &str) -> StoreResult<()>;

    /// Registers `handler` against every channel matching `pattern`
    /// (glob-style wildcards). The handler runs once per delivered message;
    /// the subscribe loop itself never dies on a per-message panic or error
    /// (spec §7) — that containment lives in each backend's dispatch loop.
    async fn subscribe(
        &self,
        pattern: &str,
        handler: Box<dyn Fn(String, String) + Send + Sync + 'static>,
    ) -> StoreResult<()>;
}
