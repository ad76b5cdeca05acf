//! Persistence layer for the NEF mobility emulator.
//!
//! The emulator keeps its topology (UEs, cells, paths) and monitoring
//! subscriptions in thread-safe in-memory stores. The mobility core only
//! depends on the repository APIs, so a database-backed implementation could
//! replace these without touching the engine.

pub mod error;
pub mod repositories;

pub use error::RepositoryError;
