//! Durable post-game aggregate persistence (spec §4.3 `handleGameOver`,
//! §6.3). The only thing this crate does is implement
//! `ttb_gameroom::StatsSink` over `tokio_postgres`, so `ttb-gameroom` itself
//! never pulls in a database client.
mod schema;
mod sink;

pub use sink::PgStatsSink;
