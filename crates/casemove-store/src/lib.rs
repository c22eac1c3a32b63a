//! # casemove-store: Persistence & Pricing Shell for Casemove
//!
//! Everything with a side effect around [`casemove_core`]: the SQLite
//! file, the rehydration hook, the live store and the pricing channels.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Casemove Data Flow                               │
//! │                                                                         │
//! │  App startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 casemove-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────┐   ┌──────────────┐   ┌────────────────────┐  │   │
//! │  │   │  Database   │   │  Persistor   │   │     AppStore       │  │   │
//! │  │   │  (pool.rs)  │──►│ (rehydrate)  │──►│ dispatch/snapshot  │  │   │
//! │  │   │  SqlitePool │   │ migrate once │   │ throttled writes   │  │   │
//! │  │   └─────────────┘   └──────────────┘   └─────────┬──────────┘  │   │
//! │  │                                                  │ PRICING_ADD │   │
//! │  │   ┌──────────────────────────────────────────────┴──────────┐  │   │
//! │  │   │ PricingService ◄── ChannelPriceBridge (mpsc requests)   │  │   │
//! │  │   └─────────────────────────────────────────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ~/.local/share/casemove/casemove.db  (persisted_state table)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use casemove_store::{AppStore, StoreConfig};
//!
//! let config = StoreConfig::load(None)?;
//! let (store, report) = AppStore::open(&config).await?;
//! store.dispatch_value(&action_json).await?;
//! store.flush().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod pricing;
pub mod rehydrate;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use pricing::{ChannelPriceBridge, PriceRequest, PricingBatch, PricingService};
pub use rehydrate::{migrate, migrate_with_report, Persistor, Rehydrated};
pub use repository::PersistedStateRepository;
pub use store::AppStore;
