use std::sync::Arc;

use async_trait::async_trait;
use tokio_postgres::Client;
use tokio_postgres::NoTls;

use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room;
use ttb_gameroom::StatsSink;

use crate::schema::CREATE_GAME_RESULTS;
use crate::schema::GAME_RESULTS;
use crate::schema::INDEX_GAME_RESULTS_PLAYER;

/// Postgres-backed error type alias, matching `rbp_pg::PgErr`.
pub type PgErr = tokio_postgres::Error;

/// Durable sink for finished-game aggregates, grounded in `rbp_pg::db()`'s
/// connect-then-spawn-the-driver shape.
pub struct PgStatsSink {
    client: Arc<Client>,
}

impl PgStatsSink {
    /// Connects to `database_url` and spawns the connection driver task,
    /// mirroring `rbp_pg::db()`. Unlike the teacher's version this returns a
    /// `Result` instead of panicking — `ttb-hosting`'s boot path decides
    /// whether a failed connection is fatal.
    pub async fn connect(database_url: &str) -> Result<Self, PgErr> {
        log::info!("connecting to postgres for game result persistence");
        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("postgres connection closed: {e}");
            }
        });
        Ok(Self { client: Arc::new(client) })
    }

    /// Creates `game_results` and its index if they don't already exist.
    pub async fn ensure_schema(&self) -> Result<(), PgErr> {
        self.client.batch_execute(CREATE_GAME_RESULTS).await?;
        self.client.batch_execute(INDEX_GAME_RESULTS_PLAYER).await?;
        Ok(())
    }
}

#[async_trait]
impl StatsSink for PgStatsSink {
    async fn record_game_over(
        &self,
        player_id: Id<Player>,
        room_id: Id<Room>,
        score: u32,
        level: u32,
        lines_cleared: u32,
    ) -> Result<(), String> {
        let query = format!(
            "INSERT INTO {GAME_RESULTS} (player_id, room_id, score, level, lines_cleared) VALUES ($1, $2, $3, $4, $5)"
        );
        self.client
            .execute(
                &query,
                &[
                    &player_id.inner(),
                    &room_id.inner(),
                    &(score as i32),
                    &(level as i32),
                    &(lines_cleared as i32),
                ],
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_ddl_mentions_the_table() {
        assert!(CREATE_GAME_RESULTS.contains(GAME_RESULTS));
        assert!(CREATE_GAME_RESULTS.contains("player_id"));
    }
}
