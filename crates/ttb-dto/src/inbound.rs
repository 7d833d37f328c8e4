use crate::PlayerAction;
use serde::Deserialize;
use serde::Serialize;
use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room;
use ttb_tetris::Board;
use ttb_tetris::PieceType;

/// The closed inbound message set (spec §6.1). Each variant is a request
/// body; the session/gateway layer dispatches on the tag and returns the
/// matching response or an `ErrorEnvelope`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    JoinAutoRoom { name: String },
    LeaveAutoRoom { room_id: Id<Room>, player_id: Id<Player> },
    HandlePlayerInput { player_id: Id<Player>, action: PlayerAction },
    GetPlayerGameState { player_id: Id<Player> },
    GetRoomPlayers { room_id: Id<Room> },
    GetRoomInfo { room_id: Id<Room> },
    GetRoomStats,
    StartRoomGame { room_id: Id<Room> },
}

/// Minimal player summary returned in join/roster responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: Id<Player>,
    pub name: String,
    pub room_id: Id<Room>,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
}

/// Wire snapshot of a `PlayerGameState` (spec §3.1), sent in
/// `getPlayerGameState` responses and `gameStateUpdate` broadcasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
    pub player_id: Id<Player>,
    pub room_id: Id<Room>,
    pub board: Board,
    pub current_piece: Option<ttb_tetris::ActivePiece>,
    pub next_piece: PieceType,
    pub held_piece: Option<PieceType>,
    pub can_hold: bool,
    pub ghost_piece: Option<ttb_tetris::ActivePiece>,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
    pub paused: bool,
    pub game_started: bool,
}

/// Aggregate stats surfaced by `getRoomStats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub total_rooms: usize,
    pub total_players: usize,
    pub rooms_playing: usize,
    pub rooms_waiting: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub id: Id<Room>,
    pub status: crate::RoomStatus,
    pub player_count: usize,
    pub max_players: usize,
    pub room_seed: i32,
}

/// The typed `{success, ...}` response shape for each inbound request
/// (spec §6.1). Error responses use `ErrorEnvelope` instead, wrapped at the
/// gateway boundary rather than folded into this enum.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundResponse {
    JoinAutoRoom { success: bool, room_id: Id<Room>, player: PlayerSummary },
    LeaveAutoRoom { success: bool },
    GetPlayerGameState { success: bool, game_state: GameStateSnapshot },
    GetRoomPlayers { success: bool, players: Vec<PlayerSummary> },
    GetRoomInfo { success: bool },
    GetRoomStats { success: bool, stats: RoomStats },
    StartRoomGame { success: bool, room_id: Id<Room>, game_seed: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_message_type_fails_to_decode() {
        let raw = serde_json::json!({"type": "attackPlayer", "name": "x"});
        let decoded: Result<InboundMessage, _> = serde_json::from_value(raw);
        assert!(decoded.is_err());
    }

    #[test]
    fn join_auto_room_decodes() {
        let raw = serde_json::json!({"type": "joinAutoRoom", "name": "alice"});
        let decoded: InboundMessage = serde_json::from_value(raw).unwrap();
        assert!(matches!(decoded, InboundMessage::JoinAutoRoom { name } if name == "alice"));
    }
}
