//! # Persisted State Sanitizer
//!
//! Repairs a persisted blob before anything reads it.
//!
//! ## Contract
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────────────┐
//! │ Input                │ Output                                           │
//! ├──────────────────────┼──────────────────────────────────────────────────┤
//! │ null                 │ {}  (first run)                                  │
//! │ not an object        │ the input, unchanged (legacy format)             │
//! │ object               │ every slice an object, every container field     │
//! │                      │ an array/object; scalars and unknown keys as-is  │
//! └──────────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! The input is never mutated. Valid containers survive deep-equal.
//! Scalars are never fabricated here; filling scalar defaults is the
//! slice normalizers' job.
//!
//! Container defaults are taken from each slice's `initial()` state, so
//! this table and the reducers cannot drift apart.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::reducers::{
    InventoryFiltersState, InventoryState, ModalMoveState, ModalTradeState, MoveState,
    PricingState, SettingsState, TradeUpState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

use Container::{Array, Object};

struct SliceRule {
    key: &'static str,
    initial: fn() -> Value,
    fields: &'static [(&'static str, Container)],
}

fn initial_of<T: Serialize>(state: T) -> Value {
    serde_json::to_value(state).unwrap_or(Value::Null)
}

static RULES: [SliceRule; 9] = [
    SliceRule {
        key: "settingsReducer",
        initial: || initial_of(SettingsState::initial()),
        fields: &[
            ("columns", Array),
            ("currencyPrice", Object),
            ("source", Object),
            ("overview", Object),
        ],
    },
    SliceRule {
        key: "tradeUpReducer",
        initial: || initial_of(TradeUpState::initial()),
        fields: &[
            ("tradeUpProducts", Array),
            ("tradeUpProductsIDS", Array),
            ("possibleOutcomes", Array),
            ("collections", Array),
            ("options", Array),
        ],
    },
    SliceRule {
        key: "inventoryFiltersReducer",
        initial: || initial_of(InventoryFiltersState::initial()),
        fields: &[
            ("inventoryFilter", Array),
            ("storageFilter", Array),
            ("inventoryFiltered", Array),
            ("storageFiltered", Array),
            ("categoryFilter", Array),
            ("rarityFilter", Array),
        ],
    },
    SliceRule {
        key: "inventoryReducer",
        initial: || initial_of(InventoryState::initial()),
        fields: &[
            ("inventory", Array),
            ("combinedInventory", Array),
            ("storageInventory", Array),
            ("storageInventoryRaw", Array),
            ("itemsLookUp", Object),
        ],
    },
    SliceRule {
        key: "moveFromReducer",
        initial: || initial_of(MoveState::initial()),
        fields: &[("activeStorages", Array), ("totalToMove", Array)],
    },
    SliceRule {
        key: "moveToReducer",
        initial: || initial_of(MoveState::initial()),
        fields: &[("activeStorages", Array), ("totalToMove", Array)],
    },
    SliceRule {
        key: "modalMoveReducer",
        initial: || initial_of(ModalMoveState::initial()),
        fields: &[
            ("storageIdsToClearFrom", Array),
            ("doCancel", Array),
            ("query", Array),
            ("modalPayload", Object),
        ],
    },
    SliceRule {
        key: "modalTradeReducer",
        initial: || initial_of(ModalTradeState::initial()),
        fields: &[("inventoryFirst", Array), ("rowToMatch", Object)],
    },
    SliceRule {
        key: "pricingReducer",
        initial: || initial_of(PricingState::initial()),
        fields: &[("prices", Object), ("productsRequested", Array)],
    },
];

// =============================================================================
// Report
// =============================================================================

/// One repaired location in the persisted tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealedField {
    pub slice: &'static str,
    /// `None` when the whole slice was missing or not an object.
    pub field: Option<&'static str>,
}

/// What the sanitizer had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub healed: Vec<HealedField>,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.healed.is_empty()
    }

    /// Distinct slices with at least one repair, in table order.
    pub fn healed_slices(&self) -> Vec<&'static str> {
        let mut slices: Vec<&'static str> = Vec::new();
        for healed in &self.healed {
            if !slices.contains(&healed.slice) {
                slices.push(healed.slice);
            }
        }
        slices
    }
}

// =============================================================================
// Sanitize
// =============================================================================

/// Returns a structurally valid copy of a persisted blob.
///
/// ```rust
/// use casemove_core::sanitize_persisted_state;
/// use serde_json::json;
///
/// assert_eq!(sanitize_persisted_state(&json!(null)), json!({}));
/// assert_eq!(sanitize_persisted_state(&json!("v1:legacy")), json!("v1:legacy"));
///
/// let healed = sanitize_persisted_state(&json!({ "settingsReducer": { "columns": null } }));
/// assert_eq!(healed["settingsReducer"]["columns"][0], "Price");
/// ```
pub fn sanitize_persisted_state(state: &Value) -> Value {
    sanitize_with_report(state).0
}

/// [`sanitize_persisted_state`], also listing every repaired location.
pub fn sanitize_with_report(state: &Value) -> (Value, SanitizeReport) {
    let mut report = SanitizeReport::default();
    let root = match state {
        Value::Null => return (Value::Object(Map::new()), report),
        Value::Object(root) => root,
        other => return (other.clone(), report),
    };

    let mut next = root.clone();
    for rule in &RULES {
        let slice = match root.get(rule.key) {
            Some(Value::Object(slice)) => slice.clone(),
            _ => {
                report.healed.push(HealedField {
                    slice: rule.key,
                    field: None,
                });
                Map::new()
            }
        };
        let slice = sanitize_slice(rule, slice, &mut report);
        next.insert(rule.key.to_string(), Value::Object(slice));
    }

    (Value::Object(next), report)
}

fn sanitize_slice(
    rule: &SliceRule,
    mut slice: Map<String, Value>,
    report: &mut SanitizeReport,
) -> Map<String, Value> {
    let mut initial: Option<Value> = None;
    for &(field, container) in rule.fields {
        let valid = match (container, slice.get(field)) {
            (Array, Some(Value::Array(_))) => true,
            (Object, Some(Value::Object(_))) => true,
            _ => false,
        };
        if valid {
            continue;
        }

        let defaults = initial.get_or_insert_with(rule.initial);
        let fallback = match (container, defaults.get(field)) {
            (Array, Some(value @ Value::Array(_))) => value.clone(),
            (Object, Some(value @ Value::Object(_))) => value.clone(),
            (Array, _) => Value::Array(Vec::new()),
            (Object, _) => Value::Object(Map::new()),
        };
        report.healed.push(HealedField {
            slice: rule.key,
            field: Some(field),
        });
        slice.insert(field.to_string(), fallback);
    }
    slice
}
