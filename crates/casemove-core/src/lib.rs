//! # casemove-core: Pure State & Pricing Logic for Casemove
//!
//! This crate guards the persisted state of the Casemove storage-unit
//! manager and turns third-party price feeds into prices the UI can show.
//! It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Casemove Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Renderer (UI)                                │   │
//! │  │   Inventory ──► Storage units ──► Trade-up ──► Overview        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ actions / state snapshots              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ casemove-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ sanitize  │  │ reducers  │  │  pricing  │  │ currency  │  │   │
//! │  │   │ persisted │  │ 9 slices  │  │ key/arith │  │  wallet   │  │   │
//! │  │   │   blob    │  │  Action   │  │ feed/conv │  │  format   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO ASYNC • NEVER PANICS ON BAD DATA                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 casemove-store (I/O shell)                      │   │
//! │  │      SQLite persistence, rehydration, pricing service           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`sanitize`] - One-shot repair of a persisted blob (`Value → Value`)
//! - [`state`] - `RootState` and the [`Normalize`] trait
//! - [`reducers`] - One typed slice per persisted reducer
//! - [`action`] - The `Action` sum type and its untyped parser
//! - [`pricing`] - Key resolution, sanitation, conversion, requests, feeds
//! - [`currency`] - Steam wallet currencies and display formatting
//! - [`types`] - Item rows and the small shapes shared by slices
//! - [`error`] - Call-contract errors
//!
//! ## Design Principles
//!
//! 1. **Heal, don't fail**: corrupt persisted data is repaired silently
//! 2. **Two layers**: the sanitizer runs once, every slice re-normalizes anyway
//! 3. **Unknown vs worthless**: NaN means "fetch it", 0 means "no value"
//! 4. **Loud contracts**: a malformed action is a `CoreError`, not a guess
//! 5. **Keep what can't be read**: odd values inside a valid container are
//!    stored verbatim and only read as defaults
//!
//! ## Example Usage
//!
//! ```rust
//! use casemove_core::{sanitize_persisted_state, Action, RootState};
//! use serde_json::json;
//!
//! let blob = json!({ "tradeUpReducer": { "tradeUpProducts": null } });
//! let healed = sanitize_persisted_state(&blob);
//! assert!(healed["tradeUpReducer"]["tradeUpProducts"].is_array());
//!
//! let state = RootState::from_persisted(&healed);
//! let action = Action::from_value(&json!({
//!     "type": "TRADEUP_ADD_REMOVE",
//!     "payload": { "item_id": "42", "item_name": "MP9 | Storm" }
//! }))
//! .unwrap();
//! let state = state.reduce(&action);
//! assert_eq!(state.trade_up.trade_up_products_ids, vec!["42"]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod action;
pub mod currency;
pub mod error;
pub mod pricing;
pub mod reducers;
pub mod sanitize;
pub mod shape;
pub mod state;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use action::Action;
pub use error::{CoreError, CoreResult};
pub use sanitize::{sanitize_persisted_state, sanitize_with_report, SanitizeReport};
pub use state::{Normalize, RootState};
pub use types::{ItemRow, ProviderPricing};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of inputs in a trade-up contract.
///
/// Adding an eleventh distinct item to a full contract is a no-op.
pub const MAX_TRADEUP_ITEMS: usize = 10;
