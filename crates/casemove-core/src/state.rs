//! # Root State
//!
//! The full persisted tree: nine slices, each owned by one reducer.
//!
//! ## Two Layers of Shape Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  persisted blob                                                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  sanitize_persisted_state()   Layer 1: Value → Value, once at startup  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  RootState::normalize()       Layer 2: Value → typed slices            │
//! │        │                      (also the only Deserialize path)         │
//! │        ▼                                                                │
//! │  RootState::reduce(action)    every slice reduces independently        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Layer 2 does not rely on layer 1 having run. A blob replayed from
//! devtools, or built by hand in a test, gets the same guarantees.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::reducers::inventory::InventoryState;
use crate::reducers::inventory_filters::InventoryFiltersState;
use crate::reducers::modal_move::ModalMoveState;
use crate::reducers::modal_trade::ModalTradeState;
use crate::reducers::moves::{MoveDirection, MoveState};
use crate::reducers::pricing::PricingState;
use crate::reducers::settings::SettingsState;
use crate::reducers::tradeup::TradeUpState;
use crate::shape::{self, normalize_from_value, object_or_empty};

// =============================================================================
// Normalize
// =============================================================================

/// Builds a well-shaped value from arbitrary JSON.
///
/// Implementations never fail. A field that is missing or of the wrong
/// kind takes its documented default; valid data passes through.
/// Applying `normalize` to the serialized output of `normalize` is a no-op.
pub trait Normalize: Sized {
    fn normalize(raw: &Value) -> Self;
}

// =============================================================================
// Root State
// =============================================================================

/// Slice keys, in persistence order.
pub const SLICE_KEYS: [&str; 9] = [
    "settingsReducer",
    "tradeUpReducer",
    "inventoryFiltersReducer",
    "inventoryReducer",
    "moveFromReducer",
    "moveToReducer",
    "modalMoveReducer",
    "modalTradeReducer",
    "pricingReducer",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RootState {
    #[serde(rename = "settingsReducer")]
    pub settings: SettingsState,
    #[serde(rename = "tradeUpReducer")]
    pub trade_up: TradeUpState,
    #[serde(rename = "inventoryFiltersReducer")]
    pub inventory_filters: InventoryFiltersState,
    #[serde(rename = "inventoryReducer")]
    pub inventory: InventoryState,
    #[serde(rename = "moveFromReducer")]
    pub move_from: MoveState,
    #[serde(rename = "moveToReducer")]
    pub move_to: MoveState,
    #[serde(rename = "modalMoveReducer")]
    pub modal_move: ModalMoveState,
    #[serde(rename = "modalTradeReducer")]
    pub modal_trade: ModalTradeState,
    #[serde(rename = "pricingReducer")]
    pub pricing: PricingState,
    /// Keys owned by other layers, e.g. `_persist`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

normalize_from_value!(RootState);

impl Normalize for RootState {
    fn normalize(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        let slice = |key: &str| obj.get(key).unwrap_or(&Value::Null);
        RootState {
            settings: SettingsState::normalize(slice("settingsReducer")),
            trade_up: TradeUpState::normalize(slice("tradeUpReducer")),
            inventory_filters: InventoryFiltersState::normalize(slice("inventoryFiltersReducer")),
            inventory: InventoryState::normalize(slice("inventoryReducer")),
            move_from: MoveState::normalize(slice("moveFromReducer")),
            move_to: MoveState::normalize(slice("moveToReducer")),
            modal_move: ModalMoveState::normalize(slice("modalMoveReducer")),
            modal_trade: ModalTradeState::normalize(slice("modalTradeReducer")),
            pricing: PricingState::normalize(slice("pricingReducer")),
            extra: shape::extra(obj, &SLICE_KEYS),
        }
    }
}

impl RootState {
    /// Builds the typed tree from a (possibly sanitized) persisted blob.
    pub fn from_persisted(blob: &Value) -> Self {
        Self::normalize(blob)
    }

    /// Runs `action` through every slice reducer.
    pub fn reduce(&self, action: &Action) -> Self {
        RootState {
            settings: self.settings.reduce(action),
            trade_up: self.trade_up.reduce(action),
            inventory_filters: self.inventory_filters.reduce(action),
            inventory: self.inventory.reduce(action),
            move_from: self.move_from.reduce(MoveDirection::From, action),
            move_to: self.move_to.reduce(MoveDirection::To, action),
            modal_move: self.modal_move.reduce(action),
            modal_trade: self.modal_trade.reduce(action),
            pricing: self.pricing.reduce(action),
            extra: self.extra.clone(),
        }
    }

    /// Normalizes an untyped tree, then reduces.
    ///
    /// Entry point for replayed state that never went through sanitation.
    pub fn reduce_value(raw: &Value, action: &Action) -> Self {
        Self::normalize(raw).reduce(action)
    }

    /// Serializes back to the persisted JSON layout.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize_persisted_state;
    use crate::types::ItemRow;
    use serde_json::json;

    #[test]
    fn test_from_persisted_null_is_initial() {
        let state = RootState::from_persisted(&Value::Null);
        assert_eq!(state, RootState::default());
    }

    #[test]
    fn test_persist_key_survives() {
        let raw = json!({ "_persist": { "version": -1, "rehydrated": true } });
        let state = RootState::from_persisted(&raw);
        let back = state.to_value();
        assert_eq!(back["_persist"], raw["_persist"]);
        for key in SLICE_KEYS {
            assert!(back[key].is_object(), "{} missing", key);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = json!({
            "settingsReducer": { "columns": null, "theme": "light" },
            "tradeUpReducer": { "tradeUpProducts": [{ "item_id": "1" }] },
            "pricingReducer": { "prices": [], "productsRequested": "x" }
        });
        let once = RootState::from_persisted(&raw);
        let twice = RootState::from_persisted(&once.to_value());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reduce_value_heals_before_reducing() {
        let raw = json!({ "tradeUpReducer": { "tradeUpProducts": null } });
        let state = RootState::reduce_value(
            &raw,
            &Action::TradeUpAddRemove(ItemRow::new("7", "MP9 | Storm")),
        );
        assert_eq!(state.trade_up.trade_up_products_ids, vec!["7".to_string()]);
    }

    fn stored_tree() -> Value {
        json!({
            "settingsReducer": {
                "columns": ["Price", 5, "Storage"],
                "theme": "dark"
            },
            "inventoryReducer": {
                "inventory": [{
                    "item_id": 27348,
                    "item_paint_wear": "0.25",
                    "pricing": {
                        "buff163": null,
                        "steam_listing": 1.5,
                        "skinport": 1.2,
                        "bitskins": 0,
                        "csfloat": 2.0
                    }
                }]
            },
            "inventoryFiltersReducer": {
                "inventoryFilter": [
                    { "include": "yes", "label": "Storage moveable" },
                    {
                        "include": true,
                        "label": "Rifles",
                        "valueToCheck": "Rifle",
                        "commandType": "checkCategory",
                        "extraKey": [1, 2]
                    }
                ]
            },
            "tradeUpReducer": { "tradeUpProductsIDS": [27348], "MinFloat": 0 }
        })
    }

    #[test]
    fn test_valid_containers_survive_verbatim() {
        let stored = sanitize_persisted_state(&stored_tree());
        let back = RootState::from_persisted(&stored).to_value();

        for (slice, fields) in stored.as_object().unwrap() {
            for (field, value) in fields.as_object().unwrap() {
                assert_eq!(&back[slice][field], value, "{}.{} changed", slice, field);
            }
        }
        assert_eq!(back["tradeUpReducer"]["MinFloat"].to_string(), "0");
    }

    #[test]
    fn test_ignored_action_changes_nothing() {
        let stored = sanitize_persisted_state(&stored_tree());
        let state = RootState::from_persisted(&stored);
        let action = Action::from_value(&json!({
            "type": "persist/REHYDRATE",
            "payload": { "item_id": "item-1" }
        }))
        .unwrap();

        let next = state.reduce(&action);
        assert_eq!(next, state);
        assert_eq!(
            next.to_value()["inventoryReducer"]["inventory"],
            stored["inventoryReducer"]["inventory"]
        );
    }

    #[test]
    fn test_added_row_is_stored_as_sent() {
        let action = Action::from_value(&json!({
            "type": "TRADEUP_ADD_REMOVE",
            "payload": { "item_id": "item-1" }
        }))
        .unwrap();
        let state = RootState::default().reduce(&action);
        assert_eq!(
            state.to_value()["tradeUpReducer"]["tradeUpProducts"],
            json!([{ "item_id": "item-1" }])
        );
    }

    #[test]
    fn test_sign_out_resets_every_slice() {
        let state = RootState::default()
            .reduce(&Action::SettingsSetTheme("light".into()))
            .reduce(&Action::MoveFromAddRemoveStorage("casket-1".into()))
            .reduce(&Action::SignOut);
        assert_eq!(state, RootState::default());
    }
}
