//! Inventory filter slice.
//!
//! Filtering itself happens in the caller; this slice only stores the
//! criteria and the already-filtered rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::{Action, FilteredInventory};
use crate::shape::{self, normalize_from_value, object_or_empty, Lenient};
use crate::state::Normalize;
use crate::types::{FilterDescriptor, ItemRow};

const KNOWN: &[&str] = &[
    "inventoryFilter",
    "storageFilter",
    "sortValue",
    "inventoryFiltered",
    "storageFiltered",
    "searchInput",
    "sortBack",
    "categoryFilter",
    "rarityFilter",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
#[serde(rename_all = "camelCase")]
pub struct InventoryFiltersState {
    pub inventory_filter: Vec<Lenient<FilterDescriptor>>,
    pub storage_filter: Vec<Lenient<FilterDescriptor>>,
    pub sort_value: Lenient<String>,
    pub inventory_filtered: Vec<ItemRow>,
    pub storage_filtered: Vec<ItemRow>,
    pub search_input: Lenient<String>,
    /// Reverse the current sort.
    pub sort_back: Lenient<bool>,
    pub category_filter: Vec<Value>,
    pub rarity_filter: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

normalize_from_value!(InventoryFiltersState);

impl Default for InventoryFiltersState {
    fn default() -> Self {
        Self::initial()
    }
}

impl Normalize for InventoryFiltersState {
    fn normalize(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        let initial = Self::initial();
        InventoryFiltersState {
            inventory_filter: shape::seq(obj, "inventoryFilter").unwrap_or(initial.inventory_filter),
            storage_filter: shape::seq(obj, "storageFilter").unwrap_or_default(),
            sort_value: shape::field(obj, "sortValue").unwrap_or(initial.sort_value),
            inventory_filtered: shape::seq(obj, "inventoryFiltered").unwrap_or_default(),
            storage_filtered: shape::seq(obj, "storageFiltered").unwrap_or_default(),
            search_input: shape::field(obj, "searchInput").unwrap_or(initial.search_input),
            sort_back: shape::field(obj, "sortBack").unwrap_or(initial.sort_back),
            category_filter: shape::seq(obj, "categoryFilter").unwrap_or_default(),
            rarity_filter: shape::seq(obj, "rarityFilter").unwrap_or_default(),
            extra: shape::extra(obj, KNOWN),
        }
    }
}

impl InventoryFiltersState {
    pub fn initial() -> Self {
        InventoryFiltersState {
            inventory_filter: vec![Lenient::new(FilterDescriptor::storage_moveable())],
            storage_filter: Vec::new(),
            sort_value: Lenient::new("Default".to_string()),
            inventory_filtered: Vec::new(),
            storage_filtered: Vec::new(),
            search_input: Lenient::new(String::new()),
            sort_back: Lenient::new(false),
            category_filter: Vec::new(),
            rarity_filter: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn reduce(&self, action: &Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::SetFiltered(filtered) => next.apply_filtered(filtered),
            Action::AllButClear(filtered) => {
                if next.sort_value == filtered.sort_value.as_str() {
                    next.flip_sort_back();
                }
                next.apply_filtered(filtered);
            }
            Action::SetFilteredStorage(storage) => {
                next.storage_filtered = storage.storage_filtered.clone();
                next.storage_filter = storage.storage_filter.clone();
            }
            Action::StoragesClearCasket(casket_id) => next
                .storage_filtered
                .retain(|row| row.storage_id() != Some(casket_id.as_str())),
            Action::SetSortStorages(rows) => next.storage_filtered = rows.clone(),
            Action::ClearAll => {
                return InventoryFiltersState {
                    inventory_filter: Vec::new(),
                    ..Self::initial()
                }
            }
            Action::MoveFromClear | Action::MoveFromClearAll => {
                next.category_filter.clear();
                next.storage_filtered.clear();
                next.storage_filter.clear();
            }
            Action::MoveToClearAll => {
                next.category_filter.clear();
                next.inventory_filter = Self::initial().inventory_filter;
            }
            Action::AddCategoryFilter(category) => {
                shape::toggle(&mut next.category_filter, category.clone())
            }
            Action::AddRarityFilter(rarity) => shape::toggle(&mut next.rarity_filter, rarity.clone()),
            Action::FiltersSetSearch(search) => next.search_input = Lenient::new(search.clone()),
            Action::SetSort(sort_value) => {
                if next.sort_value == sort_value.as_str() {
                    next.flip_sort_back();
                } else {
                    next.sort_value = Lenient::new(sort_value.clone());
                    next.sort_back = Lenient::new(false);
                }
            }
            Action::SignOut => return Self::initial(),
            _ => {}
        }
        next
    }

    /// Typed view of the inventory criteria. Entries of another shape are skipped.
    pub fn inventory_criteria(&self) -> Vec<FilterDescriptor> {
        self.inventory_filter.iter().filter_map(Lenient::get).collect()
    }

    fn flip_sort_back(&mut self) {
        self.sort_back = Lenient::new(!self.sort_back.get_or(false));
    }

    fn apply_filtered(&mut self, filtered: &FilteredInventory) {
        self.inventory_filter = filtered.inventory_filter.clone();
        self.sort_value = Lenient::new(filtered.sort_value.clone());
        self.inventory_filtered = filtered.inventory_filtered.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::FilteredStorage;
    use serde_json::json;

    fn filtered(sort_value: &str) -> FilteredInventory {
        FilteredInventory {
            inventory_filter: vec![],
            sort_value: sort_value.to_string(),
            inventory_filtered: vec![ItemRow::new("1", "AWP | Asiimov")],
        }
    }

    #[test]
    fn test_normalize_defaults_filter() {
        let state = InventoryFiltersState::normalize(&json!({
            "inventoryFilter": null,
            "rarityFilter": "bad",
            "sortValue": "Price"
        }));
        assert_eq!(state.inventory_criteria(), vec![FilterDescriptor::storage_moveable()]);
        assert!(state.rarity_filter.is_empty());
        assert_eq!(state.sort_value, "Price");
    }

    #[test]
    fn test_stored_filters_survive_verbatim() {
        let raw = json!({
            "inventoryFilter": [
                {
                    "include": true,
                    "label": "Storage moveable",
                    "valueToCheck": "item_moveable",
                    "commandType": "checkBooleanVariable",
                    "extraKey": 1
                },
                { "include": "yes", "label": "Rifles" }
            ],
            "sortBack": "sometimes"
        });
        let state = InventoryFiltersState::normalize(&raw).reduce(&Action::Unknown("X".into()));
        assert_eq!(state.inventory_criteria().len(), 1);

        let back = serde_json::to_value(&state).unwrap();
        assert_eq!(back["inventoryFilter"], raw["inventoryFilter"]);
        assert_eq!(back["sortBack"], raw["sortBack"]);
    }

    #[test]
    fn test_set_filtered_replaces_wholesale() {
        let state = InventoryFiltersState::initial().reduce(&Action::SetFiltered(filtered("Price")));
        assert!(state.inventory_filter.is_empty());
        assert_eq!(state.sort_value, "Price");
        assert_eq!(state.inventory_filtered.len(), 1);
        assert_eq!(state.sort_back, false);
    }

    #[test]
    fn test_all_but_clear_flips_sort_back_on_repeat() {
        let state = InventoryFiltersState::initial().reduce(&Action::AllButClear(filtered("Default")));
        assert_eq!(state.sort_back, true);
        let state = state.reduce(&Action::AllButClear(filtered("Price")));
        assert_eq!(state.sort_back, true);
        assert_eq!(state.sort_value, "Price");
    }

    #[test]
    fn test_set_sort() {
        let state = InventoryFiltersState::initial().reduce(&Action::SetSort("Default".into()));
        assert_eq!(state.sort_back, true);
        let state = state.reduce(&Action::SetSort("Price".into()));
        assert_eq!(state.sort_back, false);
        assert_eq!(state.sort_value, "Price");
    }

    #[test]
    fn test_clear_casket_drops_its_rows() {
        let inside = ItemRow::new("1", "AWP | Asiimov").with("storage_id", "casket-1");
        let outside = ItemRow::new("2", "AWP | Asiimov");
        let state = InventoryFiltersState::initial()
            .reduce(&Action::SetFilteredStorage(FilteredStorage {
                storage_filtered: vec![inside, outside],
                storage_filter: vec![],
            }))
            .reduce(&Action::StoragesClearCasket("casket-1".into()));
        assert_eq!(state.storage_filtered.len(), 1);
        assert_eq!(state.storage_filtered[0].item_id().as_deref(), Some("2"));
    }

    #[test]
    fn test_category_toggle() {
        let state = InventoryFiltersState::initial()
            .reduce(&Action::AddCategoryFilter(json!("Rifle")))
            .reduce(&Action::AddCategoryFilter(json!("Pistol")))
            .reduce(&Action::AddCategoryFilter(json!("Rifle")));
        assert_eq!(state.category_filter, vec![json!("Pistol")]);
    }

    #[test]
    fn test_clear_all_empties_inventory_filter() {
        let state = InventoryFiltersState::initial().reduce(&Action::ClearAll);
        assert!(state.inventory_filter.is_empty());
        let state = state.reduce(&Action::MoveToClearAll);
        assert_eq!(state.inventory_filter.len(), 1);
    }
}
