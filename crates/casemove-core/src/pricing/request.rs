//! # Price Requests
//!
//! Decides which items need a price fetch and records them as requested.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rows ──► get_price(row) is NaN? ──► key not in productsRequested?     │
//! │                                           │                             │
//! │                                           ▼                             │
//! │                          ┌────────────────┴────────────────┐            │
//! │                          ▼                                 ▼            │
//! │              bridge.request_price(rows)     dispatch(PRICING_ADD_TO_    │
//! │              (fire and forget)                       REQUESTED(rows))   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both happen synchronously in the same call. Rows sharing a price key
//! are sent once per batch.

use crate::action::Action;
use crate::pricing::convert::PriceConverter;
use crate::types::ItemRow;

/// Capability to ask the pricing collaborator for prices.
pub trait PriceBridge {
    fn request_price(&self, rows: &[ItemRow]);
}

impl<F> PriceBridge for F
where
    F: Fn(&[ItemRow]),
{
    fn request_price(&self, rows: &[ItemRow]) {
        self(rows)
    }
}

/// Queues price fetches for unknown prices, at most once per key.
pub struct PriceRequester<'a, B, D>
where
    B: PriceBridge + ?Sized,
    D: FnMut(Action),
{
    converter: PriceConverter<'a>,
    bridge: &'a B,
    dispatch: D,
}

impl<'a, B, D> PriceRequester<'a, B, D>
where
    B: PriceBridge + ?Sized,
    D: FnMut(Action),
{
    pub fn new(converter: PriceConverter<'a>, bridge: &'a B, dispatch: D) -> Self {
        PriceRequester {
            converter,
            bridge,
            dispatch,
        }
    }

    /// True if a fetch for this item's key has already been recorded.
    pub fn is_requested(&self, item: &ItemRow) -> bool {
        self.converter
            .pricing()
            .is_requested(&self.converter.price_key(item))
    }

    fn needs_fetch(&self, item: &ItemRow) -> bool {
        self.converter.get_price(item, false).is_nan() && !self.is_requested(item)
    }

    /// Requests a single item if its price is unknown and not yet requested.
    pub fn handle_requested(&mut self, item: &ItemRow) -> bool {
        self.handle_request_array(std::slice::from_ref(item)) > 0
    }

    /// Requests every unknown, unrequested item in one batch.
    ///
    /// Returns the number of rows sent.
    pub fn handle_request_array(&mut self, items: &[ItemRow]) -> usize {
        let mut seen: Vec<String> = Vec::new();
        let mut rows: Vec<ItemRow> = Vec::new();
        for item in items {
            if !self.needs_fetch(item) {
                continue;
            }
            let key = self.converter.price_key(item);
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            rows.push(item.clone());
        }

        if rows.is_empty() {
            return 0;
        }

        tracing::debug!(count = rows.len(), "Requesting prices");
        self.bridge.request_price(&rows);
        let count = rows.len();
        (self.dispatch)(Action::PricingAddToRequested(rows));
        count
    }
}
