use std::collections::HashMap;

use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room as RoomMarker;
use ttb_dto::PlayerSummary;
use ttb_dto::RoomStatus;

use crate::actor::PlayerActorHandle;

/// In-process record for one seated player (spec §3.1 `Player`). The actor
/// handle lets the room dispatch actions and pull snapshots without a
/// store round-trip; `name`/`score`/`level`/`lines_cleared` are a roster
/// mirror kept current by `Lobby` so `getRoomPlayers` doesn't need to poll
/// every actor just to list a lobby.
#[derive(Clone)]
pub struct Seat {
    pub id: Id<Player>,
    pub name: String,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub actor: PlayerActorHandle,
}

impl Seat {
    pub fn summary(&self, room_id: Id<RoomMarker>) -> PlayerSummary {
        PlayerSummary {
            id: self.id,
            name: self.name.clone(),
            room_id,
            score: self.score,
            level: self.level,
            lines_cleared: self.lines_cleared,
        }
    }
}

/// A multiplayer lobby of up to `ttb_core::ROOM_CAPACITY` players sharing a
/// `room_seed` but with independent per-player simulations (spec §3.1, §4.5
/// glossary "Room"). Mutable fields (`status`, `seats`, `last_activity`) are
/// guarded by the single `tokio::sync::Mutex` `Lobby` takes per room — every
/// mutation (join/leave/start) happens under that lock, so there is no
/// separate per-field synchronization here.
pub struct Room {
    pub id: Id<RoomMarker>,
    pub status: RoomStatus,
    pub room_seed: i32,
    pub created_at: i64,
    pub last_activity: i64,
    pub seats: HashMap<Id<Player>, Seat>,
}

impl Room {
    pub fn new(id: Id<RoomMarker>, room_seed: i32, now: i64) -> Self {
        Self {
            id,
            status: RoomStatus::Waiting,
            room_seed,
            created_at: now,
            last_activity: now,
            seats: HashMap::new(),
        }
    }

    pub fn current_players(&self) -> usize {
        self.seats.len()
    }

    pub fn has_capacity(&self) -> bool {
        self.current_players() < ttb_core::ROOM_CAPACITY
    }

    pub fn touch(&mut self, now: i64) {
        self.last_activity = now;
    }

    pub fn summaries(&self) -> Vec<PlayerSummary> {
        self.seats.values().map(|seat| seat.summary(self.id)).collect()
    }
}
