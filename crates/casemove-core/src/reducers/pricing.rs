//! # Pricing Slice
//!
//! Known prices keyed by price key, plus the keys already requested.
//!
//! `productsRequested` is derived bookkeeping: every change recomputes it
//! from the previous list and the new keys, de-duplicated in first-seen
//! order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::pricing::key::get_price_key;
use crate::shape::{self, normalize_from_value, object_or_empty, Lenient};
use crate::state::Normalize;
use crate::types::ItemRow;

const KNOWN: &[&str] = &["prices", "productsRequested"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
#[serde(rename_all = "camelCase")]
pub struct PricingState {
    /// Price key → `{ provider: price }`.
    pub prices: Map<String, Value>,
    pub products_requested: Vec<Lenient<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

normalize_from_value!(PricingState);

impl Normalize for PricingState {
    fn normalize(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        PricingState {
            prices: shape::mapping(obj, "prices").unwrap_or_default(),
            products_requested: shape::seq(obj, "productsRequested").unwrap_or_default(),
            extra: shape::extra(obj, KNOWN),
        }
    }
}

impl PricingState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn reduce(&self, action: &Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::PricingAddToRequested(rows) => {
                let keys = rows
                    .iter()
                    .map(|row| Lenient::new(get_price_key(row, Some(&self.prices))));
                next.products_requested = dedup(self.products_requested.iter().cloned().chain(keys));
            }
            Action::PricingAdd(rows) => {
                for row in rows {
                    next.insert_row(row);
                }
            }
            Action::PricingClearRequested => next.products_requested.clear(),
            Action::SignOut => return Self::initial(),
            _ => {}
        }
        next
    }

    /// Returns true if a fetch for `key` is already in flight.
    pub fn is_requested(&self, key: &str) -> bool {
        self.products_requested.iter().any(|k| k == key)
    }

    fn insert_row(&mut self, row: &ItemRow) {
        let Some(pricing @ Value::Object(_)) = row.get("pricing") else {
            return;
        };
        let key = get_price_key(row, Some(&self.prices));
        if !key.is_empty() {
            self.prices.insert(key, pricing.clone());
        }
    }
}

fn dedup(keys: impl Iterator<Item = Lenient<String>>) -> Vec<Lenient<String>> {
    let mut out: Vec<Lenient<String>> = Vec::new();
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderPricing;
    use serde_json::json;

    fn priced(id: &str, name: &str, wear: &str, steam: f64) -> ItemRow {
        let mut row = ItemRow::new(id, name).with_wear(wear);
        row.set_pricing(ProviderPricing {
            steam_listing: steam,
            ..Default::default()
        });
        row
    }

    #[test]
    fn test_add_keeps_provider_prices_as_stored() {
        let row = ItemRow::new("1", "Glove Case").with(
            "pricing",
            json!({ "buff163": null, "steam_listing": 1.5, "csfloat": 2.0 }),
        );
        let state = PricingState::initial().reduce(&Action::PricingAdd(vec![row]));
        assert_eq!(
            state.prices["Glove Case"],
            json!({ "buff163": null, "steam_listing": 1.5, "csfloat": 2.0 })
        );
    }

    #[test]
    fn test_requested_is_deduplicated() {
        let rows = vec![
            ItemRow::new("1", "AK-47").with_wear("Field-Tested"),
            ItemRow::new("2", "AK-47").with_wear("Field-Tested"),
            ItemRow::new("3", "Glove Case"),
        ];
        let state = PricingState::initial().reduce(&Action::PricingAddToRequested(rows.clone()));
        let state = state.reduce(&Action::PricingAddToRequested(rows));
        assert_eq!(state.products_requested, vec!["AK-47 (Field-Tested)", "Glove Case"]);
        assert!(state.is_requested("Glove Case"));

        let state = state.reduce(&Action::PricingClearRequested);
        assert!(state.products_requested.is_empty());
    }

    #[test]
    fn test_add_stores_pricing_under_key() {
        let state = PricingState::initial().reduce(&Action::PricingAdd(vec![
            priced("1", "AK-47", "Field-Tested", 12.5),
            ItemRow::new("2", "No pricing"),
        ]));
        assert_eq!(state.prices.len(), 1);
        assert_eq!(state.prices["AK-47 (Field-Tested)"]["steam_listing"], json!(12.5));
    }

    #[test]
    fn test_normalize_heals_prices() {
        let state = PricingState::normalize(&json!({ "prices": null, "productsRequested": {} }));
        assert!(state.prices.is_empty());
        assert!(state.products_requested.is_empty());
    }
}
