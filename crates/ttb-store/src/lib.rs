//! The abstract state store contract (spec §4.6): get/set/del, set
//! membership, hash records, and pub/sub — plus the two backends that
//! satisfy it and the short-TTL read-through cache that fronts hot reads.
//!
//! Nothing above this crate knows whether records live in-memory or in an
//! external store; `ttb-gameroom` only ever sees the `StateStore` trait.
mod cache;
mod keys;
mod memory;
mod redis_store;
mod store;

pub use cache::CachedStore;
pub use keys::*;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::StateStore;
pub use store::StoreResult;
