//! # Provider Feed Ingestion
//!
//! Turns a raw third-party pricing payload into per-item [`ProviderPricing`].
//!
//! ## Payload Shape
//! ```text
//! {
//!   "AK-47 | Redline (Field-Tested)": {
//!     "steam":    { "last_24h": 21.3, "last_7d": 20.9, "last_30d": .., "last_90d": .. },
//!     "buff163":  { "starting_at": { "price": 18.4 } },
//!     "skinport": { "starting_at": 19.1 }
//!   },
//!   ...
//! }
//! ```
//!
//! ## Acceptance
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  new payload has ≥1 entry with a candidate > 0?                        │
//! │        ├── yes → Accepted                                               │
//! │        └── no  → backup valid? ── yes → FellBackToBackup                │
//! │                                  └─ no  → Rejected (previous kept)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected payload is a soft failure: it is reported, never raised.

use serde_json::{Map, Value};

use crate::pricing::arith::{sanitize_price, sanitize_price_number};
use crate::pricing::key::get_price_key;
use crate::types::{ItemRow, ProviderPricing};

/// Steam windows, most recent first. The first positive one wins.
const STEAM_WINDOWS: [&str; 4] = [
    "/steam/last_24h",
    "/steam/last_7d",
    "/steam/last_30d",
    "/steam/last_90d",
];
const STEAM_7D: &str = "/steam/last_7d";
const BUFF_STARTING_AT: &str = "/buff163/starting_at/price";
const SKINPORT_STARTING_AT: &str = "/skinport/starting_at";

/// Every provider price a payload entry may carry.
static CANDIDATES: [&str; 6] = [
    "/steam/last_24h",
    "/steam/last_7d",
    "/steam/last_30d",
    "/steam/last_90d",
    SKINPORT_STARTING_AT,
    BUFF_STARTING_AT,
];

/// Above this buff163 price, a missing 7-day Steam price is estimated.
pub const BUFF_ESTIMATE_THRESHOLD: f64 = 2000.0;
/// Steam estimate as a fraction of the buff163 price.
pub const BUFF_TO_STEAM_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// Freshly fetched from the pricing CDN.
    Normal,
    /// The bundled last-known-good snapshot.
    Backup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    Accepted,
    FellBackToBackup,
    Rejected,
}

/// Sanitizes one provider price. Anything invalid is 0 ("worthless").
pub fn normalize_provider_price(value: Option<&Value>) -> f64 {
    value.map_or(0.0, |v| sanitize_price_number(v, 0.0))
}

fn candidates(entry: &Value) -> impl Iterator<Item = f64> + '_ {
    CANDIDATES
        .iter()
        .map(move |pointer| normalize_provider_price(entry.pointer(pointer)))
}

/// True if any entry carries at least one positive provider price.
pub fn payload_has_valid_price(payload: &Value) -> bool {
    match payload {
        Value::Object(entries) => has_valid_price(entries),
        _ => false,
    }
}

fn has_valid_price(entries: &Map<String, Value>) -> bool {
    entries
        .values()
        .any(|entry| candidates(entry).any(|price| price > 0.0))
}

/// Provider prices for one item. Items absent from the payload get zeros.
pub fn resolve_item_pricing(item: &ItemRow, payload: &Map<String, Value>) -> ProviderPricing {
    let key = get_price_key(item, Some(payload));
    let entry = match payload.get(&key) {
        Some(entry) if !entry.is_null() => entry,
        _ => return ProviderPricing::default(),
    };

    let buff163 = normalize_provider_price(entry.pointer(BUFF_STARTING_AT));
    let skinport = normalize_provider_price(entry.pointer(SKINPORT_STARTING_AT));
    let mut steam_listing = STEAM_WINDOWS
        .iter()
        .map(|pointer| normalize_provider_price(entry.pointer(pointer)))
        .find(|price| *price > 0.0)
        .unwrap_or(0.0);

    if normalize_provider_price(entry.pointer(STEAM_7D)) == 0.0 && buff163 > BUFF_ESTIMATE_THRESHOLD {
        steam_listing = sanitize_price(buff163 * BUFF_TO_STEAM_RATIO, 0.0);
    }

    ProviderPricing {
        buff163,
        steam_listing,
        skinport,
        bitskins: 0.0,
    }
}

/// The active provider payload and where it came from.
#[derive(Debug, Clone, Default)]
pub struct PriceFeed {
    prices: Map<String, Value>,
    source: Option<FeedSource>,
}

impl PriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source of the payload in use, `None` until one is accepted.
    pub fn source(&self) -> Option<FeedSource> {
        self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Installs `payload` if it carries any valid price, otherwise `backup`.
    pub fn set_pricing(&mut self, payload: Value, source: FeedSource, backup: Option<&Value>) -> FeedOutcome {
        if let Value::Object(entries) = payload {
            if has_valid_price(&entries) {
                tracing::debug!(?source, entries = entries.len(), "Pricing payload accepted");
                self.prices = entries;
                self.source = Some(source);
                return FeedOutcome::Accepted;
            }
        }

        match backup {
            Some(Value::Object(entries)) if has_valid_price(entries) => {
                tracing::debug!(?source, "Pricing payload rejected, using backup");
                self.prices = entries.clone();
                self.source = Some(FeedSource::Backup);
                FeedOutcome::FellBackToBackup
            }
            _ => {
                tracing::debug!(?source, "Pricing payload rejected, no usable backup");
                FeedOutcome::Rejected
            }
        }
    }

    pub fn resolve(&self, item: &ItemRow) -> ProviderPricing {
        resolve_item_pricing(item, &self.prices)
    }

    /// Attaches pricing to moveable, named rows. Others are left as-is.
    pub fn handle_items(&self, rows: &mut [ItemRow]) {
        for row in rows.iter_mut().filter(|r| !r.item_name().is_empty() && r.item_moveable()) {
            let pricing = self.resolve(row);
            row.set_pricing(pricing);
        }
    }

    /// Attaches pricing to every row.
    pub fn handle_trade_up(&self, rows: &mut [ItemRow]) {
        for row in rows.iter_mut() {
            let pricing = self.resolve(row);
            row.set_pricing(pricing);
        }
    }
}
