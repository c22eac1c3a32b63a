//! # Price Arithmetic
//!
//! Numeric sanitation and overflow-safe composition for prices.
//!
//! ## Two Kinds of "No Price"
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   0.0   known to be worthless or invalid (sentinel, absurd ceiling)     │
//! │   NaN   unknown, should be fetched                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every helper here returns either a finite value within
//! `±MAX_SAFE_PRICE` or NaN. `Infinity` never escapes.
//!
//! ## Usage
//! ```rust
//! use casemove_core::pricing::arith::{safe_multiply, sanitize_price, MAX_SAFE_PRICE};
//!
//! assert_eq!(safe_multiply(MAX_SAFE_PRICE, 2.0), MAX_SAFE_PRICE);
//! assert_eq!(sanitize_price(20_000_000.0, f64::NAN), 0.0);
//! assert_eq!(sanitize_price(12.3456, f64::NAN), 12.35);
//! ```

use serde_json::Value;

// =============================================================================
// Constants
// =============================================================================

/// Feed placeholder sentinel: anything this large is "no data" in disguise.
pub const PRICE_PLACEHOLDER_THRESHOLD: f64 = f64::MAX / 1024.0;

/// Ceiling for a plausible market price in the feed's currency unit.
pub const MAX_REASONABLE_MARKET_PRICE: f64 = 10_000_000.0;

/// Largest integer a double represents exactly (2^53 - 1).
pub const MAX_SAFE_PRICE: f64 = 9_007_199_254_740_991.0;

// =============================================================================
// Coercion
// =============================================================================

/// Coerces a JSON value to a number.
///
/// Numbers and numeric strings convert; everything else, and any
/// non-finite result, is NaN.
pub fn to_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    };
    if n.is_finite() {
        n
    } else {
        f64::NAN
    }
}

/// Like [`to_number`], treating a missing value as NaN.
pub fn to_number_opt(value: Option<&Value>) -> f64 {
    value.map_or(f64::NAN, to_number)
}

// =============================================================================
// Sanitation
// =============================================================================

/// Sanitizes an untyped price from a third-party feed.
///
/// Non-numeric input yields `fallback`; see [`sanitize_price`] for the rest.
pub fn sanitize_price_number(value: &Value, fallback: f64) -> f64 {
    sanitize_price(to_number(value), fallback)
}

/// Sanitizes a price.
///
/// - non-finite → `fallback`
/// - `|v| >= PRICE_PLACEHOLDER_THRESHOLD` → 0
/// - `|v| > MAX_REASONABLE_MARKET_PRICE` → 0
/// - otherwise rounded to cents
pub fn sanitize_price(value: f64, fallback: f64) -> f64 {
    if !value.is_finite() {
        return fallback;
    }
    let magnitude = value.abs();
    if magnitude >= PRICE_PLACEHOLDER_THRESHOLD || magnitude > MAX_REASONABLE_MARKET_PRICE {
        return 0.0;
    }
    round_to_cents(value)
}

/// Rounds half-up to two decimals, nudged by `EPSILON` so that values like
/// `1.005` land on the upper cent.
pub fn round_to_cents(value: f64) -> f64 {
    (((value + f64::EPSILON) * 100.0) + 0.5).floor() / 100.0
}

/// Clamps to `±MAX_SAFE_PRICE`. Non-finite input becomes NaN.
pub fn clamp_price(value: f64) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }
    value.clamp(-MAX_SAFE_PRICE, MAX_SAFE_PRICE)
}

// =============================================================================
// Safe Composition
// =============================================================================

#[inline]
fn either_nan(a: f64, b: f64) -> bool {
    a.is_nan() || b.is_nan()
}

/// `a + b`, clamped. NaN if either operand is NaN.
pub fn safe_add(a: f64, b: f64) -> f64 {
    if either_nan(a, b) {
        return f64::NAN;
    }
    clamp_price(a + b)
}

/// `a × b`, clamped. NaN if either operand is NaN.
pub fn safe_multiply(a: f64, b: f64) -> f64 {
    if either_nan(a, b) {
        return f64::NAN;
    }
    let product = a * b;
    if product.is_infinite() {
        // Overflowed past f64::MAX; the sign still tells which bound.
        return product.signum() * MAX_SAFE_PRICE;
    }
    clamp_price(product)
}

/// `a ÷ b`, clamped. Division by zero yields `fallback`, never `Infinity`.
pub fn safe_divide(a: f64, b: f64, fallback: f64) -> f64 {
    if either_nan(a, b) {
        return f64::NAN;
    }
    if b == 0.0 {
        return fallback;
    }
    let quotient = a / b;
    if quotient.is_infinite() {
        return quotient.signum() * MAX_SAFE_PRICE;
    }
    clamp_price(quotient)
}

/// `percent`% of `value`, clamped.
pub fn safe_percent(value: f64, percent: f64) -> f64 {
    safe_divide(safe_multiply(value, percent), 100.0, f64::NAN)
}
