use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use crate::store::StateStore;
use crate::store::StoreResult;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

type Handler = Box<dyn Fn(String, String) + Send + Sync + 'static>;

/// In-process `StateStore` backed by `dashmap`, for tests and single-process
/// development (spec §4.6). Subscriptions are held in a plain `Mutex`-guarded
/// `Vec` and walked on every `publish` — there is no partitioning need at this
/// scale, unlike the concurrent record maps which back every other table.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, Entry>,
    sets: DashMap<String, HashSet<String>>,
    hashes: DashMap<String, HashMap<String, String>>,
    subscriptions: Mutex<Vec<(String, Handler)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_expired(entry: &Entry) -> bool {
        entry.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Matches a redis-style glob `pattern` (the only wildcard this workspace's
/// namespace uses is a trailing `*`, per `ttb_store::keys::PATTERN_*`)
/// against `channel`.
fn pattern_matches(pattern: &str, channel: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => channel.starts_with(prefix),
        None => pattern == channel,
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self.records.get(key) {
            Some(entry) if !Self::is_expired(&entry) => Ok(Some(entry.value.clone())),
            Some(_) => {
                self.records.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> StoreResult<()> {
        self.records.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl_secs.map(|s| Instant::now() + Duration::from_secs(s)),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.records.remove(key);
        Ok(())
    }

    async fn sadd(&self, set_key: &str, member: &str) -> StoreResult<()> {
        self.sets
            .entry(set_key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn srem(&self, set_key: &str, member: &str) -> StoreResult<()> {
        if let Some(mut set) = self.sets.get_mut(set_key) {
            set.remove(member);
        }
        Ok(())
    }

    async fn smembers(&self, set_key: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .sets
            .get(set_key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn hset(&self, key: &str, map: HashMap<String, String>) -> StoreResult<()> {
        self.hashes.entry(key.to_string()).or_default().extend(map);
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        Ok(self.hashes.get(key).map(|h| h.clone()).unwrap_or_default())
    }

    async fn publish(&self, channel: &str, message: &str) -> StoreResult<()> {
        let subscriptions = self.subscriptions.lock().expect("subscriptions lock poisoned");
        for (pattern, handler) in subscriptions.iter() {
            if pattern_matches(pattern, channel) {
                handler(channel.to_string(), message.to_string());
            }
        }
        Ok(())
    }

    async fn subscribe(&self, pattern: &str, handler: Handler) -> StoreResult<()> {
        self.subscriptions
            .lock()
            .expect("subscriptions lock poisoned")
            .push((pattern.to_string(), handler));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryStore::new();
        store.set("room:1", "payload", None).await.unwrap();
        assert_eq!(store.get("room:1").await.unwrap(), Some("payload".to_string()));
    }

    #[tokio::test]
    async fn del_removes_the_key() {
        let store = MemoryStore::new();
        store.set("room:1", "payload", None).await.unwrap();
        store.del("room:1").await.unwrap();
        assert_eq!(store.get("room:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_ttl_reads_as_absent() {
        let store = MemoryStore::new();
        store.set("player_game:1", "x", Some(0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.get("player_game:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_membership_add_remove() {
        let store = MemoryStore::new();
        store.sadd("active_rooms", "r1").await.unwrap();
        store.sadd("active_rooms", "r2").await.unwrap();
        store.srem("active_rooms", "r1").await.unwrap();
        let members = store.smembers("active_rooms").await.unwrap();
        assert_eq!(members, vec!["r2".to_string()]);
    }

    #[tokio::test]
    async fn publish_delivers_to_matching_pattern_only() {
        let store = MemoryStore::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counted = hits.clone();
        store
            .subscribe(
                "game_state_update:*",
                Box::new(move |_chan, _msg| {
                    counted.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();
        store.publish("game_state_update:p1", "{}").await.unwrap();
        store.publish("room_state_update:r1", "{}").await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
