//! Inventory slice: the user's items and the contents of loaded storage units.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::{Action, StorageContents};
use crate::shape::{self, normalize_from_value, object_or_empty};
use crate::state::Normalize;
use crate::types::ItemRow;

const KNOWN: &[&str] = &[
    "inventory",
    "combinedInventory",
    "storageInventory",
    "storageInventoryRaw",
    "itemsLookUp",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
#[serde(rename_all = "camelCase")]
pub struct InventoryState {
    pub inventory: Vec<ItemRow>,
    /// Identical items folded into one row with `combined_QTY`.
    pub combined_inventory: Vec<ItemRow>,
    /// Rows from every loaded storage unit, tagged with `storage_id`.
    pub storage_inventory: Vec<ItemRow>,
    /// Same rows before combining.
    pub storage_inventory_raw: Vec<ItemRow>,
    #[serde(rename = "itemsLookUp")]
    pub items_look_up: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

normalize_from_value!(InventoryState);

impl Normalize for InventoryState {
    fn normalize(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        InventoryState {
            inventory: shape::seq(obj, "inventory").unwrap_or_default(),
            combined_inventory: shape::seq(obj, "combinedInventory").unwrap_or_default(),
            storage_inventory: shape::seq(obj, "storageInventory").unwrap_or_default(),
            storage_inventory_raw: shape::seq(obj, "storageInventoryRaw").unwrap_or_default(),
            items_look_up: shape::mapping(obj, "itemsLookUp").unwrap_or_default(),
            extra: shape::extra(obj, KNOWN),
        }
    }
}

impl InventoryState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn reduce(&self, action: &Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::InventorySetInventory(contents) => {
                next.inventory = contents.inventory.clone();
                next.combined_inventory = contents.combined_inventory.clone();
            }
            Action::InventorySetItemsLookUp(lookup) => next.items_look_up = lookup.clone(),
            Action::StoragesAddTo(contents) => next.replace_casket(contents),
            Action::StoragesClearCasket(casket_id) => next.drop_casket(casket_id),
            Action::StoragesClearAll => {
                next.storage_inventory.clear();
                next.storage_inventory_raw.clear();
            }
            Action::SignOut => return Self::initial(),
            _ => {}
        }
        next
    }

    /// Rows currently loaded from one storage unit.
    pub fn casket_rows<'a>(&'a self, casket_id: &'a str) -> impl Iterator<Item = &'a ItemRow> {
        self.storage_inventory
            .iter()
            .filter(move |row| in_casket(row, casket_id))
    }

    fn replace_casket(&mut self, contents: &StorageContents) {
        self.drop_casket(&contents.casket_id);
        let rows = contents.storage_data.iter().map(|row| {
            let mut row = row.clone();
            if row.get("storage_id").map_or(true, Value::is_null) {
                row.set("storage_id", contents.casket_id.clone());
            }
            row
        });
        let rows: Vec<ItemRow> = rows.collect();
        self.storage_inventory_raw.extend(rows.iter().cloned());
        self.storage_inventory.extend(rows);
    }

    fn drop_casket(&mut self, casket_id: &str) {
        self.storage_inventory.retain(|row| !in_casket(row, casket_id));
        self.storage_inventory_raw.retain(|row| !in_casket(row, casket_id));
    }
}

fn in_casket(row: &ItemRow, casket_id: &str) -> bool {
    row.storage_id() == Some(casket_id)
}
