//! The per-player simulation state machine: `PlayerState`, the closed
//! client action set, the soft-lock/hard-drop pipeline, hold, bag
//! progression, and the server-initiated repair operations.
//!
//! This crate knows about board/piece rules (`ttb-tetris`) and the wire
//! action enum (`ttb-dto`), but nothing about rooms, the state store, or
//! transport — those are `ttb-gameroom`'s job.
mod repair;
mod seed;
mod snapshot;
mod state;

pub use repair::FALLBACK_SPAWN_OFFSETS;
pub use seed::generate_seed;
pub use state::ActionOutcome;
pub use state::PlayerState;
