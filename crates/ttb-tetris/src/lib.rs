//! Pure tetris core: board, piece shapes, SRS rotation and wall kicks,
//! line clear, scoring, level/drop-interval formulas, ghost/hard-drop, the
//! spawn-test game-over check, and the seeded 7-bag generator.
//!
//! Every function here is pure — no I/O, no shared state.
#![forbid(unsafe_code)]

mod active;
mod board;
mod kicks;
mod piece;
mod rng;
mod scoring;

pub use active::*;
pub use board::*;
pub use piece::*;
pub use rng::*;
pub use scoring::*;
