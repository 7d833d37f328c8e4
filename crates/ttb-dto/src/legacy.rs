//! The legacy network-sync protocol and the legacy per-game flow, kept only
//! so the decoder never fails closed on a frame a still-negotiating client
//! sends (spec §6.1, §9). No handler in `ttb-hosting` acts on the legacy
//! per-game flow — it is documented in spec §9 as a droppable compatibility
//! shim and is not wired up. The network-sync frames decode so a client that
//! negotiates them doesn't get a hard connection error; `seq` duplicate/
//! out-of-order rejection and desync bookkeeping happen at the gateway.
use serde::Deserialize;
use serde::Serialize;
use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room;

/// Network-sync protocol inbound frames (spec §6.1). Each carries a
/// monotonic `seq`; `input_event` duplicates or out-of-order `seq` are
/// rejected by the gateway before reaching any business logic.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncFrame {
    JoinGame { seq: u64, room_id: Id<Room>, player_id: Id<Player> },
    MatchReady { seq: u64, room_id: Id<Room> },
    InputEvent { seq: u64, player_id: Id<Player>, action: crate::PlayerAction },
    Ping { seq: u64, client_time: i64 },
    SnapshotRequest { seq: u64, player_id: Id<Player> },
    Ack { seq: u64 },
    Keepalive { seq: u64 },
    DesyncReport { seq: u64, player_id: Id<Player>, detail: String },
}

/// Network-sync protocol outbound frames. `server_time` lets the client
/// estimate clock offset against `ClientSession.clockOffset`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncReply {
    Pong { seq: u64, server_time: i64 },
    StateSnapshot { seq: u64, server_time: i64, snapshot: crate::GameStateSnapshot },
}

/// Tracks duplicate/out-of-order `seq` rejection for one connection
/// (spec §6.1). Lives at the gateway, one per `ClientSession`.
#[derive(Debug, Default)]
pub struct SeqTracker {
    last_seq: Option<u64>,
}

impl SeqTracker {
    /// Accepts `seq` if it's strictly greater than the last accepted value.
    pub fn accept(&mut self, seq: u64) -> bool {
        match self.last_seq {
            Some(last) if seq <= last => false,
            _ => {
                self.last_seq = Some(seq);
                true
            }
        }
    }
}

/// The legacy per-game flow (spec §9): `joinGame`/`startGame`/
/// `playerEliminated`. Decodable for compatibility; no handler acts on it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LegacyMessage {
    JoinGame { game_id: String, name: String },
    StartGame { game_id: String },
    PlayerEliminated { game_id: String, player_id: Id<Player> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_tracker_rejects_duplicates_and_reorders() {
        let mut tracker = SeqTracker::default();
        assert!(tracker.accept(1));
        assert!(tracker.accept(2));
        assert!(!tracker.accept(2));
        assert!(!tracker.accept(1));
        assert!(tracker.accept(3));
    }

    #[test]
    fn legacy_join_game_still_decodes() {
        let raw = serde_json::json!({"type": "joinGame", "gameId": "g1", "name": "bob"});
        let decoded: LegacyMessage = serde_json::from_value(raw).unwrap();
        assert!(matches!(decoded, LegacyMessage::JoinGame { .. }));
    }
}
