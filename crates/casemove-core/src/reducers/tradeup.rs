//! # Trade-Up Slice
//!
//! The contract builder: up to ten input items, their possible outcomes,
//! and the browsing filters around them.
//!
//! ## The Locked Set
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products.len()   possibleOutcomes after TRADEUP_ADD_REMOVE            │
//! │  ─────────────    ──────────────────────────────────────────           │
//! │  0..=9            cleared (outcomes only exist for a full contract)     │
//! │  10               kept (supplied externally via TRADEUP_SET_POSSIBLE)   │
//! │  11               never reached: adding to a full set is a no-op        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `tradeUpProductsIDS` is derived: every add/remove rebuilds it from
//! `tradeUpProducts`, never patches it in place. Normalization leaves a
//! stored list alone, like every other valid container.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::action::Action;
use crate::pricing::arith::{safe_add, safe_divide, safe_percent};
use crate::pricing::convert::PriceConverter;
use crate::shape::{self, normalize_from_value, object_or_empty, Lenient};
use crate::state::Normalize;
use crate::types::ItemRow;
use crate::MAX_TRADEUP_ITEMS;

const KNOWN: &[&str] = &[
    "tradeUpProducts",
    "tradeUpProductsIDS",
    "possibleOutcomes",
    "searchInput",
    "MinFloat",
    "MaxFloat",
    "collections",
    "options",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct TradeUpState {
    #[serde(rename = "tradeUpProducts")]
    pub trade_up_products: Vec<ItemRow>,
    /// Parallel to `trade_up_products`: `ids[i] == products[i].item_id`,
    /// in whatever JSON type the row stores it.
    #[serde(rename = "tradeUpProductsIDS")]
    pub trade_up_products_ids: Vec<Value>,
    #[serde(rename = "possibleOutcomes")]
    pub possible_outcomes: Vec<ItemRow>,
    #[serde(rename = "searchInput")]
    pub search_input: Lenient<String>,
    #[serde(rename = "MinFloat")]
    pub min_float: Lenient<f64>,
    #[serde(rename = "MaxFloat")]
    pub max_float: Lenient<f64>,
    pub collections: Vec<Lenient<String>>,
    pub options: Vec<Lenient<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

normalize_from_value!(TradeUpState);

impl Default for TradeUpState {
    fn default() -> Self {
        Self::initial()
    }
}

impl Normalize for TradeUpState {
    fn normalize(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        let initial = Self::initial();
        TradeUpState {
            trade_up_products: shape::seq(obj, "tradeUpProducts").unwrap_or_default(),
            trade_up_products_ids: shape::seq(obj, "tradeUpProductsIDS").unwrap_or_default(),
            possible_outcomes: shape::seq(obj, "possibleOutcomes").unwrap_or_default(),
            search_input: shape::field(obj, "searchInput").unwrap_or(initial.search_input),
            min_float: shape::field(obj, "MinFloat").unwrap_or(initial.min_float),
            max_float: shape::field(obj, "MaxFloat").unwrap_or(initial.max_float),
            collections: shape::seq(obj, "collections").unwrap_or(initial.collections),
            options: shape::seq(obj, "options").unwrap_or(initial.options),
            extra: shape::extra(obj, KNOWN),
        }
    }
}

impl TradeUpState {
    pub fn initial() -> Self {
        TradeUpState {
            trade_up_products: Vec::new(),
            trade_up_products_ids: Vec::new(),
            possible_outcomes: Vec::new(),
            search_input: Lenient::new(String::new()),
            min_float: Lenient::from_value(Value::from(0)),
            max_float: Lenient::from_value(Value::from(1)),
            collections: Vec::new(),
            options: vec![Lenient::new("Hide equipped".to_string())],
            extra: Map::new(),
        }
    }

    pub fn reduce(&self, action: &Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::TradeUpAddRemove(row) => {
                let id = row.item_id();
                let before = next.trade_up_products.len();
                next.trade_up_products.retain(|p| p.item_id() != id);
                if next.trade_up_products.len() == before {
                    if before >= MAX_TRADEUP_ITEMS {
                        return next;
                    }
                    next.trade_up_products.push(row.clone());
                }
                next.trade_up_products_ids = ids_of(&next.trade_up_products);
                if next.trade_up_products.len() != MAX_TRADEUP_ITEMS {
                    next.possible_outcomes.clear();
                }
            }
            Action::TradeUpAddRemoveCollection(collection) => {
                shape::toggle(&mut next.collections, Lenient::new(collection.clone()))
            }
            Action::TradeUpAddRemoveOption(option) => {
                shape::toggle(&mut next.options, Lenient::new(option.clone()))
            }
            Action::TradeUpSetSearch(search) => next.search_input = Lenient::new(search.clone()),
            Action::TradeUpSetMin(value) => next.min_float = Lenient::new(*value),
            Action::TradeUpSetMax(value) => next.max_float = Lenient::new(*value),
            Action::TradeUpSetPossible(outcomes) => next.possible_outcomes = outcomes.clone(),
            Action::TradeUpReset => {
                return TradeUpState {
                    collections: next.collections,
                    ..Self::initial()
                }
            }
            Action::SignOut => return Self::initial(),
            _ => {}
        }
        next
    }

    /// True once the contract holds the maximum number of inputs.
    pub fn is_full(&self) -> bool {
        self.trade_up_products.len() >= MAX_TRADEUP_ITEMS
    }

    /// Average float, total input price and expected outcome value.
    pub fn summary(&self, converter: &PriceConverter<'_>) -> TradeUpSummary {
        let count = self.trade_up_products.len() as f64;
        let wear_sum = self
            .trade_up_products
            .iter()
            .fold(0.0, |acc, item| safe_add(acc, item.item_paint_wear().unwrap_or(0.0)));
        let total_price = self
            .trade_up_products
            .iter()
            .fold(0.0, |acc, item| safe_add(acc, converter.get_price(item, true)));
        let expected_value = self.possible_outcomes.iter().fold(0.0, |acc, outcome| {
            let weighted = safe_percent(
                converter.get_price(outcome, true),
                outcome.percentage().unwrap_or(0.0),
            );
            safe_add(acc, if weighted.is_nan() { 0.0 } else { weighted })
        });

        TradeUpSummary {
            average_float: safe_divide(wear_sum, count, 0.0),
            total_price,
            expected_value,
        }
    }
}

/// Aggregates shown under the contract builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TradeUpSummary {
    pub average_float: f64,
    pub total_price: f64,
    pub expected_value: f64,
}

/// Items the user has marked for, or confirmed in, a trade-up.
pub fn eligible_trade_up_products(items: &[ItemRow]) -> Vec<ItemRow> {
    items
        .iter()
        .filter(|item| item.is_trade_up_eligible())
        .cloned()
        .collect()
}

fn ids_of(products: &[ItemRow]) -> Vec<Value> {
    products.iter().map(ItemRow::item_id_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::pricing::PricingState;
    use crate::reducers::settings::SettingsState;
    use serde_json::json;

    fn add(state: &TradeUpState, id: &str) -> TradeUpState {
        state.reduce(&Action::TradeUpAddRemove(ItemRow::new(id, "P250 | Sand Dune")))
    }

    fn filled(n: usize) -> TradeUpState {
        (0..n).fold(TradeUpState::initial(), |state, i| add(&state, &i.to_string()))
    }

    #[test]
    fn test_add_remove_toggles_and_rebuilds_ids() {
        let state = add(&TradeUpState::initial(), "a");
        let state = add(&state, "b");
        assert_eq!(state.trade_up_products_ids, vec!["a", "b"]);

        let state = add(&state, "a");
        assert_eq!(state.trade_up_products_ids, vec!["b"]);
        assert_eq!(state.trade_up_products.len(), 1);
    }

    #[test]
    fn test_tenth_item_keeps_outcomes() {
        let mut state = filled(9);
        state.possible_outcomes = vec![ItemRow::new("out", "AK-47 | Redline")];

        let state = add(&state, "9");
        assert_eq!(state.trade_up_products.len(), 10);
        assert_eq!(state.possible_outcomes.len(), 1);
    }

    #[test]
    fn test_below_ten_clears_outcomes() {
        let mut state = filled(10);
        state.possible_outcomes = vec![ItemRow::new("out", "AK-47 | Redline")];

        let state = add(&state, "3");
        assert_eq!(state.trade_up_products.len(), 9);
        assert!(state.possible_outcomes.is_empty());
    }

    #[test]
    fn test_eleventh_distinct_item_is_noop() {
        let mut state = filled(10);
        state.possible_outcomes = vec![ItemRow::new("out", "AK-47 | Redline")];

        let next = add(&state, "extra");
        assert_eq!(next, state);
        assert!(next.is_full());
    }

    #[test]
    fn test_normalize_keeps_stored_ids() {
        let state = TradeUpState::normalize(&json!({
            "tradeUpProducts": [{ "item_id": "1" }, { "item_id": "2" }],
            "tradeUpProductsIDS": ["stale"],
            "options": null,
            "MaxFloat": 0.5
        }));
        assert_eq!(state.trade_up_products_ids, vec!["stale"]);
        assert_eq!(state.options, vec!["Hide equipped"]);
        assert_eq!(state.max_float, 0.5);

        let state = state.reduce(&Action::TradeUpAddRemove(ItemRow::new("3", "MP9 | Storm")));
        assert_eq!(state.trade_up_products_ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_numeric_ids_keep_their_type() {
        let state = TradeUpState::normalize(&json!({
            "tradeUpProducts": [{ "item_id": 27348, "item_name": "MP9 | Storm" }],
            "tradeUpProductsIDS": [27348],
            "MinFloat": 0
        }));
        let back = serde_json::to_value(&state).unwrap();
        assert_eq!(back["tradeUpProductsIDS"], json!([27348]));
        assert_eq!(back["MinFloat"], json!(0));

        let state = state.reduce(&Action::TradeUpAddRemove(ItemRow::new("27348", "MP9 | Storm")));
        assert!(state.trade_up_products.is_empty());
        assert!(state.trade_up_products_ids.is_empty());
    }

    #[test]
    fn test_collection_and_option_toggles() {
        let state = TradeUpState::initial()
            .reduce(&Action::TradeUpAddRemoveCollection("The Dust 2 Collection".into()))
            .reduce(&Action::TradeUpAddRemoveOption("Hide equipped".into()));
        assert_eq!(state.collections, vec!["The Dust 2 Collection"]);
        assert!(state.options.is_empty());
    }

    #[test]
    fn test_reset_keeps_collections() {
        let state = add(&TradeUpState::initial(), "a")
            .reduce(&Action::TradeUpAddRemoveCollection("The Mirage Collection".into()))
            .reduce(&Action::TradeUpSetMin(0.2))
            .reduce(&Action::TradeUpReset);
        assert!(state.trade_up_products.is_empty());
        assert_eq!(state.min_float, 0.0);
        assert_eq!(state.collections, vec!["The Mirage Collection"]);
    }

    #[test]
    fn test_eligible_products() {
        let marked = ItemRow::new("1", "P250 | Sand Dune").with("tradeUp", true);
        let plain = ItemRow::new("2", "P250 | Sand Dune");
        let eligible = eligible_trade_up_products(&[marked, plain]);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].item_id().as_deref(), Some("1"));
    }

    #[test]
    fn test_summary() {
        let settings = SettingsState::normalize(&json!({
            "currency": "USD",
            "currencyPrice": { "USD": 1 }
        }));
        let pricing = PricingState::normalize(&json!({
            "prices": {
                "P250 | Sand Dune (Field-Tested)": { "steam_listing": 0.05 },
                "AK-47 | Redline (Field-Tested)": { "steam_listing": 20.0 }
            }
        }));
        let converter = PriceConverter::new(&settings, &pricing);

        let mut state = TradeUpState::initial();
        for (id, wear) in [("1", 0.2), ("2", 0.4)] {
            let row = ItemRow::new(id, "P250 | Sand Dune")
                .with_wear("Field-Tested")
                .with("item_paint_wear", wear);
            state.trade_up_products.push(row);
        }
        let outcome = ItemRow::new("o", "AK-47 | Redline")
            .with_wear("Field-Tested")
            .with("percentage", 50.0);
        state.possible_outcomes.push(outcome);

        let summary = state.summary(&converter);
        assert!((summary.average_float - 0.3).abs() < 1e-9);
        assert!((summary.total_price - 0.1).abs() < 1e-9);
        assert_eq!(summary.expected_value, 10.0);
    }

    #[test]
    fn test_empty_summary_has_no_nan() {
        let settings = SettingsState::initial();
        let pricing = PricingState::initial();
        let summary = TradeUpState::initial().summary(&PriceConverter::new(&settings, &pricing));
        assert_eq!(summary.average_float, 0.0);
        assert_eq!(summary.total_price, 0.0);
        assert_eq!(summary.expected_value, 0.0);
    }
}
