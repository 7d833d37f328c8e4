//! Session/Gateway (spec §4.7): the actix-web + actix-ws surface for the
//! closed inbound message set, socket→player bookkeeping, and the pub/sub
//! fan-out that forwards state-store broadcasts to connected clients.
//!
//! Grounded on `rbp_hosting`'s `Casino`/`Client` bridge shape — generalized
//! from "poker casino of tables" to "tetris lobby of rooms" (see
//! `DESIGN.md`; `rbp_hosting::casino`/`handle` were not present in the
//! retrieval pack and are authored fresh here in the same shape).
mod dispatch;
mod gateway;
mod server;
mod session;

pub use gateway::Gateway;
pub use server::Server;
