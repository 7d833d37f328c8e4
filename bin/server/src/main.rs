//! Tetris battle server binary: loads configuration, wires the state store
//! and durable stats sink, and binds the session/gateway HTTP+WebSocket
//! surface (spec §6.3 environment, §4.7 entry point).
//!
//! Mirrors the teacher's `src/bin/hosting.rs` entrypoint shape: init
//! logging and the shutdown signal before binding, one call each.
use std::sync::Arc;

use ttb_core::Config;
use ttb_gameroom::Lobby;
use ttb_gameroom::NullStatsSink;
use ttb_gameroom::StatsSink;
use ttb_store::CachedStore;
use ttb_store::MemoryStore;
use ttb_store::RedisStore;
use ttb_store::StateStore;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env();
    ttb_core::log(config.development);
    ttb_core::kys();

    let store: Arc<dyn StateStore> = match RedisStore::connect(&config.store_url).await {
        Ok(redis) => {
            log::info!("connected to state store at {}", config.store_url);
            Arc::new(CachedStore::new(Arc::new(redis)))
        }
        Err(e) => {
            log::warn!("state store unavailable ({e}), falling back to an in-process store");
            Arc::new(MemoryStore::new())
        }
    };

    let stats: Arc<dyn StatsSink> = match &config.db_url {
        Some(url) => match ttb_records::PgStatsSink::connect(url).await {
            Ok(sink) => {
                if let Err(e) = sink.ensure_schema().await {
                    log::error!("failed to ensure game_results schema: {e}");
                }
                Arc::new(sink)
            }
            Err(e) => {
                log::warn!("durable stats store unavailable ({e}), post-game stats will not persist");
                Arc::new(NullStatsSink)
            }
        },
        None => Arc::new(NullStatsSink),
    };

    let lobby = Arc::new(Lobby::new(store.clone(), stats));
    ttb_hosting::Server::run(config.port, lobby, store).await
}
