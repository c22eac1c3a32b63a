//! # Price Key Resolution
//!
//! Maps an item to the key its price is stored under.
//!
//! ```text
//! item_name = "Sticker | Crown (Holo/Foil)"   item_wear_name = ""
//!        │
//!        ▼  "(Holo/Foil)" → "(Holo-Foil)"
//! base_name = "Sticker | Crown (Holo-Foil)"
//!        │
//!        ▼  wear present? append " (<wear>)"
//! wear_key  = base_name
//!        │
//!        ▼  wear_key in map? → base_name in map? → first non-empty
//! ```
//!
//! Wear-specific listings are more accurate than aggregate ones, so the
//! wear key always wins when both exist.

use serde_json::{Map, Value};

use crate::types::ItemRow;

/// Feed naming differs from inventory naming for holo/foil stickers.
const HOLO_FOIL_INVENTORY: &str = "(Holo/Foil)";
const HOLO_FOIL_FEED: &str = "(Holo-Foil)";

/// The name an item is listed under, without wear.
pub fn base_name(item: &ItemRow) -> String {
    item.item_name().replace(HOLO_FOIL_INVENTORY, HOLO_FOIL_FEED)
}

/// The name including wear, or the base name when the item has no wear.
pub fn wear_key(item: &ItemRow) -> String {
    let base = base_name(item);
    match item.wear_name() {
        Some(wear) => format!("{} ({})", base, wear),
        None => base,
    }
}

/// Resolves the lookup key for `item` against an optional price map.
///
/// ## Example
/// ```rust
/// use casemove_core::pricing::key::get_price_key;
/// use casemove_core::types::ItemRow;
/// use serde_json::json;
///
/// let item = ItemRow::new("1", "AK-47").with_wear("Factory New");
/// let prices = json!({ "AK-47": { "steam_listing": 1.0 } });
/// assert_eq!(get_price_key(&item, prices.as_object()), "AK-47");
/// ```
pub fn get_price_key(item: &ItemRow, prices: Option<&Map<String, Value>>) -> String {
    let base = base_name(item);
    let wear = wear_key(item);

    if let Some(prices) = prices {
        if is_listed(prices, &wear) {
            return wear;
        }
        if is_listed(prices, &base) {
            return base;
        }
    }

    if !wear.is_empty() {
        wear
    } else {
        base
    }
}

fn is_listed(prices: &Map<String, Value>, key: &str) -> bool {
    !key.is_empty() && prices.get(key).is_some_and(|entry| !entry.is_null())
}
