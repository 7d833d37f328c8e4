use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::store::StateStore;
use crate::store::StoreResult;

/// Production `StateStore` backend (spec §4.6): a thin typed wrapper over a
/// redis connection, mirroring the teacher's `rbp_pg::db()` connect-once-
/// share-the-handle shape. No vendor type leaks past this module — every
/// other crate in the workspace only ever sees `StateStore`.
pub struct RedisStore {
    connection: Mutex<redis::aio::MultiplexedConnection>,
    client: redis::Client,
}

impl RedisStore {
    /// Connects to `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> StoreResult<Self> {
        log::info!("connecting to state store");
        let client = redis::Client::open(url).map_err(|e| e.to_string())?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| e.to_string())?;
        Ok(Self {
            connection: Mutex::new(connection),
            client,
        })
    }
}

#[async_trait]
impl StateStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.connection
            .lock()
            .await
            .get(key)
            .await
            .map_err(|e| e.to_string())
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> StoreResult<()> {
        let mut conn = self.connection.lock().await;
        match ttl_secs {
            Some(ttl) => conn.set_ex(key, value, ttl).await.map_err(|e| e.to_string()),
            None => conn.set(key, value).await.map_err(|e| e.to_string()),
        }
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.connection
            .lock()
            .await
            .del(key)
            .await
            .map_err(|e| e.to_string())
    }

    async fn sadd(&self, set_key: &str, member: &str) -> StoreResult<()> {
        self.connection
            .lock()
            .await
            .sadd(set_key, member)
            .await
            .map_err(|e| e.to_string())
    }

    async fn srem(&self, set_key: &str, member: &str) -> StoreResult<()> {
        self.connection
            .lock()
            .await
            .srem(set_key, member)
            .await
            .map_err(|e| e.to_string())
    }

    async fn smembers(&self, set_key: &str) -> StoreResult<Vec<String>> {
        self.connection
            .lock()
            .await
            .smembers(set_key)
            .await
            .map_err(|e| e.to_string())
    }

    async fn hset(&self, key: &str, map: HashMap<String, String>) -> StoreResult<()> {
        if map.is_empty() {
            return Ok(());
        }
        let pairs: Vec<(String, String)> = map.into_iter().collect();
        self.connection
            .lock()
            .await
            .hset_multiple(key, &pairs)
            .await
            .map_err(|e| e.to_string())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        self.connection
            .lock()
            .await
            .hgetall(key)
            .await
            .map_err(|e| e.to_string())
    }

    async fn publish(&self, channel: &str, message: &str) -> StoreResult<()> {
        self.connection
            .lock()
            .await
            .publish(channel, message)
            .await
            .map_err(|e| e.to_string())
    }

    /// Spawns a long-lived task holding its own pub/sub connection,
    /// `PSUBSCRIBE`d to `pattern`. The loop never dies on a per-message
    /// failure (spec §7) — `handler` panics are not caught (handlers in this
    /// workspace never panic; see `ttb-hosting`'s fan-out dispatch), but a
    /// connection-level stream error simply ends this one task's loop and is
    /// logged rather than propagated to the caller that started the server.
    async fn subscribe(
        &self,
        pattern: &str,
        handler: Box<dyn Fn(String, String) + Send + Sync + 'static>,
    ) -> StoreResult<()> {
        use futures::StreamExt;

        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| e.to_string())?;
        pubsub.psubscribe(pattern).await.map_err(|e| e.to_string())?;
        let pattern = pattern.to_string();

        tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while let Some(msg) = stream.next().await {
                let channel = msg.get_channel_name().to_string();
                let payload: String = match msg.get_payload() {
                    Ok(payload) => payload,
                    Err(e) => {
                        log::warn!("store subscription {pattern}: undecodable payload: {e}");
                        continue;
                    }
                };
                handler(channel, payload);
            }
            log::warn!("store subscription {pattern}: connection closed");
        });
        Ok(())
    }
}
