//! # Reducers
//!
//! One module per persisted slice. Each slice follows the same contract:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  XState::normalize(&Value) → XState     never fails, idempotent       │
//! │  XState::initial()         → XState     the first-run state           │
//! │  XState::reduce(&self, &Action) → XState                              │
//! │      • returns a new value, `self` is untouched                       │
//! │      • unrecognised actions return the state unchanged                │
//! │      • SIGN_OUT returns initial()                                     │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Typed states can only be deserialized through `normalize`, so a typed
//! value is always well-shaped. [`crate::state::RootState::reduce_value`]
//! is the entry point for untyped state.

pub mod inventory;
pub mod inventory_filters;
pub mod modal_move;
pub mod modal_trade;
pub mod moves;
pub mod pricing;
pub mod settings;
pub mod tradeup;

pub use inventory::InventoryState;
pub use inventory_filters::InventoryFiltersState;
pub use modal_move::ModalMoveState;
pub use modal_trade::ModalTradeState;
pub use moves::{MoveDirection, MoveState, TransferEntry};
pub use pricing::PricingState;
pub use settings::SettingsState;
pub use tradeup::{eligible_trade_up_products, TradeUpState, TradeUpSummary};
