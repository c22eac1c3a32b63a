//! # Domain Types
//!
//! Shapes shared by the reducers and the pricing engine.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    ItemRow      │   │  PriceSource    │   │ProviderPricing  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  item_name      │   │  title (key)    │   │  buff163        │       │
//! │  │  item_wear_name │   │  name           │   │  steam_listing  │       │
//! │  │  item_id        │   │  avatar         │   │  skinport       │       │
//! │  │  pricing ───────┼───┼─────────────────┼──►│  bitskins       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Overview     │   │FilterDescriptor │   │  ModalPayload   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rows Are Stored Verbatim
//! `ItemRow` is produced by the inventory-sync collaborator and carries far
//! more metadata than the core reads (stickers, rarity, collection...).
//! A row keeps the JSON it arrived as and exposes typed getters over it:
//! unknown fields, odd types and absent fields all survive a load/save
//! cycle exactly. Only the fields the core writes (`pricing`,
//! `storage_id`) ever change.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::pricing::arith::to_number;
use crate::shape::id_key;

// =============================================================================
// Item Row
// =============================================================================

/// A skin/item record as delivered by the inventory collaborator.
///
/// Usually an object. Anything else is carried along untouched and reads
/// as a row with no fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    raw: Value,
}

impl Default for ItemRow {
    fn default() -> Self {
        ItemRow {
            raw: Value::Object(Map::new()),
        }
    }
}

impl From<Value> for ItemRow {
    fn from(raw: Value) -> Self {
        ItemRow { raw }
    }
}

impl Serialize for ItemRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ItemRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ItemRow::from)
    }
}

impl ItemRow {
    /// Creates a row with an id and a market name. Mostly for tests and fixtures.
    pub fn new(item_id: impl Into<String>, item_name: impl Into<String>) -> Self {
        ItemRow::default()
            .with("item_id", Value::String(item_id.into()))
            .with("item_name", Value::String(item_name.into()))
    }

    /// Sets the wear name.
    pub fn with_wear(self, wear: impl Into<String>) -> Self {
        self.with("item_wear_name", Value::String(wear.into()))
    }

    /// Sets any field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        self.raw
    }

    pub fn is_object(&self) -> bool {
        self.raw.is_object()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Writes one field. A row that is not an object cannot carry fields
    /// and is left as it is.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        if let Value::Object(fields) = &mut self.raw {
            fields.insert(key.to_string(), value.into());
        }
    }

    /// Market name without wear, e.g. "AK-47 | Redline". Empty if absent.
    pub fn item_name(&self) -> &str {
        self.str_field("item_name").unwrap_or_default()
    }

    /// Wear name as stored, e.g. "Field-Tested". May be empty.
    pub fn item_wear_name(&self) -> Option<&str> {
        self.str_field("item_wear_name")
    }

    /// Returns the wear name when it is present and non-empty.
    pub fn wear_name(&self) -> Option<&str> {
        self.item_wear_name().filter(|wear| !wear.is_empty())
    }

    /// Asset identifier as a string, whether stored as string or number.
    pub fn item_id(&self) -> Option<String> {
        id_key(self.get("item_id"))
    }

    /// Asset identifier exactly as stored, `null` when absent.
    pub fn item_id_value(&self) -> Value {
        self.get("item_id").cloned().unwrap_or(Value::Null)
    }

    /// Float wear value in 0..1.
    pub fn item_paint_wear(&self) -> Option<f64> {
        self.number_field("item_paint_wear")
    }

    /// Whether the item can be moved into a storage unit.
    pub fn item_moveable(&self) -> bool {
        self.bool_field("item_moveable")
    }

    /// Casket the item currently lives in, if any.
    pub fn storage_id(&self) -> Option<&str> {
        self.str_field("storage_id")
    }

    pub fn trade_up(&self) -> bool {
        self.bool_field("tradeUp")
    }

    pub fn trade_up_confirmed(&self) -> bool {
        self.bool_field("tradeUpConfirmed")
    }

    /// Number of identical items folded into this row.
    pub fn combined_qty(&self) -> Option<f64> {
        self.number_field("combined_QTY")
    }

    /// Outcome probability in percent (trade-up outcomes only).
    pub fn percentage(&self) -> Option<f64> {
        self.number_field("percentage")
    }

    /// Provider prices, when attached and well-formed.
    pub fn pricing(&self) -> Option<ProviderPricing> {
        self.get("pricing")
            .and_then(|pricing| ProviderPricing::deserialize(pricing).ok())
    }

    pub fn set_pricing(&mut self, pricing: ProviderPricing) {
        if let Ok(value) = serde_json::to_value(pricing) {
            self.set("pricing", value);
        }
    }

    /// Returns true if the row is marked for, or confirmed in, a trade-up.
    pub fn is_trade_up_eligible(&self) -> bool {
        self.trade_up_confirmed() || self.trade_up()
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn bool_field(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    fn number_field(&self, key: &str) -> Option<f64> {
        self.get(key).map(to_number).filter(|n| !n.is_nan())
    }
}

// =============================================================================
// Provider Pricing
// =============================================================================

/// Per-provider prices for one item, in the feed's currency unit.
///
/// `0` means "known to be worthless or invalid", never "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProviderPricing {
    #[serde(default)]
    pub buff163: f64,
    #[serde(default)]
    pub steam_listing: f64,
    #[serde(default)]
    pub skinport: f64,
    #[serde(default)]
    pub bitskins: f64,
}

impl ProviderPricing {
    /// Returns the price for a provider title as used by `PriceSource::title`.
    pub fn get(&self, provider: &str) -> Option<f64> {
        match provider {
            "buff163" => Some(self.buff163),
            "steam_listing" => Some(self.steam_listing),
            "skinport" => Some(self.skinport),
            "bitskins" => Some(self.bitskins),
            _ => None,
        }
    }
}

// =============================================================================
// Settings Shapes
// =============================================================================

/// The pricing provider selected in settings.
///
/// `title` is the provider key looked up in the price map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceSource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

impl PriceSource {
    /// The Steam Community Market source every fresh install starts with.
    pub fn steam_listing() -> Self {
        PriceSource {
            title: "steam_listing".to_string(),
            name: "Steam Community Market".to_string(),
            avatar: "https://steamcommunity.com/favicon.ico".to_string(),
        }
    }
}

/// Overview page chart selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Overview {
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub chartleft: String,
    #[serde(rename = "chartRight", default)]
    pub chart_right: String,
}

impl Overview {
    /// Default charts: price-based, overall left, item distribution right.
    pub fn initial() -> Self {
        Overview {
            by: "price".to_string(),
            chartleft: "overall".to_string(),
            chart_right: "itemDistribution".to_string(),
        }
    }
}

// =============================================================================
// Filter Shapes
// =============================================================================

/// One inventory filter criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FilterDescriptor {
    #[serde(default)]
    pub include: bool,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value_to_check: String,
    #[serde(default)]
    pub command_type: String,
}

impl FilterDescriptor {
    /// The filter applied on first run: only items that can be moved.
    pub fn storage_moveable() -> Self {
        FilterDescriptor {
            include: true,
            label: "Storage moveable".to_string(),
            value_to_check: "item_moveable".to_string(),
            command_type: "checkBooleanVariable".to_string(),
        }
    }
}

// =============================================================================
// Modal Shapes
// =============================================================================

/// Progress of an in-flight storage move.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ModalPayload {
    #[serde(default)]
    pub number: u32,
    #[serde(rename = "itemID", default)]
    pub item_id: String,
    #[serde(rename = "isLast", default)]
    pub is_last: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_row_round_trips_verbatim() {
        let raw = json!({
            "item_name": "AK-47 | Redline",
            "item_wear_name": "Field-Tested",
            "item_id": 27348,
            "item_paint_wear": "0.25",
            "stickers": [{ "name": "Crown (Foil)" }],
            "pricing": { "buff163": null, "steam_listing": 1.5, "csfloat": 2.0 }
        });
        let row: ItemRow = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(row.item_id(), Some("27348".to_string()));
        assert_eq!(row.wear_name(), Some("Field-Tested"));
        assert_eq!(row.item_paint_wear(), Some(0.25));
        assert_eq!(row.pricing(), None);

        assert_eq!(serde_json::to_value(&row).unwrap(), raw);
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let row: ItemRow = serde_json::from_value(json!({ "item_id": "item-1" })).unwrap();
        assert!(!row.item_moveable());
        assert!(!row.trade_up());
        assert_eq!(row.item_name(), "");
        assert_eq!(serde_json::to_value(&row).unwrap(), json!({ "item_id": "item-1" }));
    }

    #[test]
    fn test_wrong_typed_fields_read_as_absent() {
        let row = ItemRow::from(json!({
            "item_id": "1",
            "item_paint_wear": "not a float",
            "tradeUp": null,
            "combined_QTY": 3
        }));
        assert_eq!(row.item_paint_wear(), None);
        assert!(!row.trade_up());
        assert_eq!(row.combined_qty(), Some(3.0));
        assert_eq!(row.as_value()["item_paint_wear"], json!("not a float"));
    }

    #[test]
    fn test_non_object_row_is_kept() {
        let mut row = ItemRow::from(json!("corrupt"));
        row.set_pricing(ProviderPricing::default());
        assert!(!row.is_object());
        assert_eq!(row.item_id(), None);
        assert_eq!(row.into_value(), json!("corrupt"));
    }

    #[test]
    fn test_empty_wear_is_no_wear() {
        let row = ItemRow::new("1", "Sticker | Crown").with_wear("");
        assert_eq!(row.wear_name(), None);
    }

    #[test]
    fn test_trade_up_eligibility() {
        let row = ItemRow::new("1", "P250 | Sand Dune");
        assert!(!row.is_trade_up_eligible());
        assert!(row.clone().with("tradeUp", true).is_trade_up_eligible());
        assert!(row.with("tradeUpConfirmed", true).is_trade_up_eligible());
    }

    #[test]
    fn test_provider_lookup() {
        let pricing = ProviderPricing {
            buff163: 1.0,
            steam_listing: 2.0,
            skinport: 3.0,
            bitskins: 0.0,
        };
        assert_eq!(pricing.get("steam_listing"), Some(2.0));
        assert_eq!(pricing.get("csfloat"), None);
    }

    #[test]
    fn test_pricing_attach() {
        let mut row = ItemRow::new("1", "Glove Case");
        row.set_pricing(ProviderPricing {
            steam_listing: 4.0,
            ..Default::default()
        });
        assert_eq!(row.pricing().unwrap().steam_listing, 4.0);
        assert_eq!(row.as_value()["pricing"]["bitskins"], json!(0.0));
    }
}
