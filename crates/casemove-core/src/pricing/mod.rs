//! # Price Engine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  feed      raw provider payload ──► ProviderPricing per item           │
//! │  key       item ──► price key (wear first, Holo/Foil normalized)       │
//! │  arith     sanitation, cents rounding, clamped safe_* helpers          │
//! │  convert   price key + source + currency rate ──► display price        │
//! │  request   unknown prices ──► bridge + PRICING_ADD_TO_REQUESTED        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here returns `Infinity` or panics on bad numbers. Unknown is
//! NaN and worthless is 0.

pub mod arith;
pub mod convert;
pub mod feed;
pub mod key;
pub mod request;

pub use convert::PriceConverter;
pub use feed::{FeedOutcome, FeedSource, PriceFeed};
pub use key::get_price_key;
pub use request::{PriceBridge, PriceRequester};
