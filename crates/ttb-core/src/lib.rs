//! Core type aliases, identifiers, and runtime configuration for the
//! tetris battle workspace.
//!
//! This crate has no knowledge of board/piece logic, transport, or the
//! state store — it only provides the vocabulary every other crate shares.
#![allow(dead_code)]

mod config;
mod id;
mod runtime;

pub use config::*;
pub use id::*;
pub use runtime::*;

/// Marker type for `Id<Player>`. Carries no data; every crate that needs to
/// name a player id imports this instead of minting its own marker, so
/// `Id<Player>` means the same type everywhere in the workspace.
pub struct Player;

/// Marker type for `Id<Room>`.
pub struct Room;

/// Seconds a room/player/player-game record survives in the state store
/// without a write refreshing it.
pub const STORE_TTL_SECS: u64 = 3600;

/// Seconds a `player_game:*` read is trusted by the in-process cache
/// before it must be re-fetched from the store.
pub const CACHE_TTL_SECS: u64 = 5;

/// Hard cap on players sharing a single room.
pub const ROOM_CAPACITY: usize = 99;

/// Board dimensions, fixed by the tetris rules.
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
