//! The room and player-actor runtime (spec §3, §4.3-§4.5, §5): owns every
//! live `PlayerGameState`, the gravity tickers that drive it, and the
//! `Lobby` that finds or creates rooms for incoming players. `ttb-hosting`
//! is the only thing above this crate; it never touches `ttb-simulation`
//! or `ttb-tetris` directly.
mod actor;
mod lobby;
mod room;
mod stats;
mod ticker;

pub use actor::PlayerActorHandle;
pub use lobby::Lobby;
pub use room::Room;
pub use room::Seat;
pub use stats::NullStatsSink;
pub use stats::StatsSink;
pub use ticker::GravityTicker;
