//! # Repositories
//!
//! One repository per table. Each holds a cloned `SqlitePool` handle.

pub mod persisted;

pub use persisted::{PersistedRecord, PersistedStateRepository};
