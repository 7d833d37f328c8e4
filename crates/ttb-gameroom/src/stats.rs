use async_trait::async_trait;
use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room;

/// Durable-store boundary for a player's final per-game aggregate (spec
/// §4.3 `handleGameOver`, §6.3). `ttb-gameroom` only depends on this trait
/// — the Postgres-backed implementation lives in `ttb-records` so this
/// crate never pulls in `tokio-postgres`, mirroring how
/// `rbp_gameroom::HistoryRepository` keeps the actor runtime decoupled from
/// the concrete database client.
#[async_trait]
pub trait StatsSink: Send + Sync {
    async fn record_game_over(
        &self,
        player_id: Id<Player>,
        room_id: Id<Room>,
        score: u32,
        level: u32,
        lines_cleared: u32,
    ) -> Result<(), String>;
}

/// No-op sink for tests and deployments without a durable store configured.
pub struct NullStatsSink;

#[async_trait]
impl StatsSink for NullStatsSink {
    async fn record_game_over(
        &self,
        _player_id: Id<Player>,
        _room_id: Id<Room>,
        _score: u32,
        _level: u32,
        _lines_cleared: u32,
    ) -> Result<(), String> {
        Ok(())
    }
}
