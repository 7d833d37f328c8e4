use crate::GameStateSnapshot;
use crate::PlayerSummary;
use serde::Deserialize;
use serde::Serialize;
use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room;

/// Lifecycle status of a `Room` (spec §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// Outbound broadcast topics (spec §6.2), published on the state store's
/// pub/sub and forwarded verbatim by the gateway to the matching transport
/// room or per-player channel (spec §4.7).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BroadcastMessage {
    /// Full or delta game state for one player, or a terminal summary.
    GameStateUpdate {
        player_id: Id<Player>,
        #[serde(flatten)]
        state: GameStateUpdatePayload,
    },
    /// Explicit start signal delivered to a single player's channel.
    GameStarted { player_id: Id<Player>, game_seed: i32 },
    /// Roster and score changes for a room.
    PlayerStateChanged { room_id: Id<Room>, players: Vec<PlayerSummary> },
    /// Room shape changes: `{roomId, players, roomInfo, playerCount, timestamp}`.
    RoomStateUpdate {
        room_id: Id<Room>,
        players: Vec<PlayerSummary>,
        player_count: usize,
        timestamp: i64,
    },
    RoomStatsUpdate { total_rooms: usize, total_players: usize },
    PlayerJoined { room_id: Id<Room>, player: PlayerSummary },
    PlayerLeft { room_id: Id<Room>, player_id: Id<Player> },
    RoomGameStarted { room_id: Id<Room>, game_seed: i32 },
    /// A player's game has ended; published on the room topic (spec §4.3
    /// `handleGameOver`) alongside a terminal `GameStateUpdate` on the
    /// player's own topic.
    PlayerGameOver {
        room_id: Id<Room>,
        player_id: Id<Player>,
        score: u32,
        level: u32,
        lines_cleared: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameStateUpdatePayload {
    Full(GameStateSnapshot),
    Terminal { game_over: bool, score: u32, level: u32, lines_cleared: u32 },
}
