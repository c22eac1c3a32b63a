//! # Error Types
//!
//! Domain-specific error types for casemove-core.
//!
//! ## What Is (and Isn't) an Error Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Failure Taxonomy                                    │
//! │                                                                         │
//! │  Structural corruption    persisted field null / wrong type            │
//! │  ────────────────────►    healed silently (sanitizer + normalizers)    │
//! │                                                                         │
//! │  Numeric corruption       sentinel, out-of-range, non-numeric price    │
//! │  ────────────────────►    normalized to 0 or NaN (pricing::arith)      │
//! │                                                                         │
//! │  Feed rejection           no positive price anywhere in a payload      │
//! │  ────────────────────►    soft failure, backup payload used            │
//! │                                                                         │
//! │  Caller contract          action payload doesn't match its type        │
//! │  ────────────────────►    CoreError (this file)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the last row produces a value of these types. Malformed *data*
//! never does.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Call-contract violations detected by the core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An untyped action had no string `type` field.
    #[error("Action has no type")]
    MissingActionType,

    /// A recognised action carried a payload of the wrong shape.
    ///
    /// ## When This Occurs
    /// - `TRADEUP_ADD_REMOVE` without `payload.item_id`
    /// - `SETTINGS_ADD_CURRENCYPRICE` whose rate is not a number
    /// - `SET_FILTERED` whose payload is not an object
    #[error("Malformed payload for {action_type}: {reason}")]
    MalformedAction { action_type: String, reason: String },
}

impl CoreError {
    /// Creates a MalformedAction error.
    pub fn malformed(action_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::MalformedAction {
            action_type: action_type.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
