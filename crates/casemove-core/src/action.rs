//! # Actions
//!
//! Every state transition the reducers understand, as one sum type.
//!
//! ## Typed vs Untyped
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Renderer / devtools replay                                            │
//! │    { "type": "TRADEUP_ADD_REMOVE", "payload": { "item_id": "7", ... } } │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  Action::from_value() ← THIS FILE                                      │
//! │                │                                                        │
//! │                ├── unknown type      → Action::Unknown(type)           │
//! │                ├── payload mismatch  → CoreError::MalformedAction      │
//! │                └── OK                → Action::TradeUpAddRemove(row)   │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  RootState::reduce(&action) ← exhaustive match per slice               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown types are not errors: they fall through every reducer to the
//! normalize-only transition.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::reducers::moves::TransferEntry;
use crate::shape::Lenient;
use crate::types::{FilterDescriptor, ItemRow, ModalPayload, Overview, PriceSource};

// =============================================================================
// Payload Types
// =============================================================================

/// `SETTINGS_ADD_CURRENCYPRICE` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrencyRate {
    pub currency: String,
    pub rate: f64,
}

/// `SET_FILTERED` / `ALL_BUT_CLEAR` payload: the caller has already
/// filtered; the reducer stores the result wholesale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredInventory {
    pub inventory_filter: Vec<Lenient<FilterDescriptor>>,
    pub sort_value: String,
    pub inventory_filtered: Vec<ItemRow>,
}

/// `SET_FILTERED_STORAGE` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredStorage {
    pub storage_filtered: Vec<ItemRow>,
    pub storage_filter: Vec<Lenient<FilterDescriptor>>,
}

/// `INVENTORY_SET_INVENTORY` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryContents {
    pub inventory: Vec<ItemRow>,
    pub combined_inventory: Vec<ItemRow>,
}

/// `INVENTORY_STORAGES_ADD_TO` payload: the full contents of one casket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageContents {
    #[serde(rename = "casketID")]
    pub casket_id: String,
    #[serde(rename = "storageData")]
    pub storage_data: Vec<ItemRow>,
}

/// `MODAL_TRADE_OPEN` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeModal {
    pub inventory_first: Vec<ItemRow>,
    pub row_to_match: Map<String, Value>,
}

#[derive(Deserialize)]
struct SearchPayload {
    #[serde(rename = "searchField")]
    search_field: String,
}

#[derive(Deserialize)]
struct SortPayload {
    #[serde(rename = "sortValue")]
    sort_value: String,
}

#[derive(Deserialize)]
struct CasketPayload {
    #[serde(rename = "casketID")]
    casket_id: String,
}

#[derive(Deserialize)]
struct SortedStoragePayload {
    #[serde(rename = "storageFiltered")]
    storage_filtered: Vec<ItemRow>,
}

// =============================================================================
// Action
// =============================================================================

/// A reducer action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // --- settings ---
    SettingsSetFastMove(bool),
    SettingsSetTheme(String),
    SettingsSetColumns(Vec<String>),
    /// `None` models the legacy `payload: true` no-op.
    SettingsSetCurrency(Option<String>),
    SettingsSetSteamLoginShow(bool),
    SettingsSetSource(PriceSource),
    SettingsSetLocale(String),
    SettingsSetOs(String),
    SettingsSetDevmode(bool),
    SettingsSetOverview(Overview),
    SettingsAddCurrencyPrice(CurrencyRate),

    // --- trade-up ---
    TradeUpAddRemove(ItemRow),
    TradeUpAddRemoveCollection(String),
    TradeUpAddRemoveOption(String),
    TradeUpSetSearch(String),
    TradeUpSetMin(f64),
    TradeUpSetMax(f64),
    TradeUpSetPossible(Vec<ItemRow>),
    TradeUpReset,

    // --- inventory filters ---
    SetFiltered(FilteredInventory),
    SetFilteredStorage(FilteredStorage),
    AllButClear(FilteredInventory),
    SetSortStorages(Vec<ItemRow>),
    ClearAll,
    AddCategoryFilter(Value),
    AddRarityFilter(Value),
    FiltersSetSearch(String),
    SetSort(String),

    // --- inventory ---
    InventorySetInventory(InventoryContents),
    InventorySetItemsLookUp(Map<String, Value>),
    StoragesAddTo(StorageContents),
    /// Handled by both the inventory and the filter slice.
    StoragesClearCasket(String),
    StoragesClearAll,

    // --- storage moves ---
    MoveFromAddRemoveStorage(String),
    MoveToAddRemoveStorage(String),
    MoveFromAddTo(TransferEntry),
    MoveToAddTo(TransferEntry),
    MoveFromClear,
    MoveFromClearAll,
    MoveToClearAll,

    // --- move modal ---
    ModalMoveSetPayload(ModalPayload),
    ModalMoveAddQuery(Value),
    ModalMoveDoCancel(Value),
    ModalMoveClearFrom(String),
    ModalMoveReset,

    // --- trade modal ---
    ModalTradeOpen(TradeModal),
    ModalTradeReset,

    // --- pricing ---
    PricingAddToRequested(Vec<ItemRow>),
    PricingAdd(Vec<ItemRow>),
    PricingClearRequested,

    /// Resets every slice.
    SignOut,

    /// Any type no reducer recognises.
    Unknown(String),
}

impl Action {
    /// Parses an untyped `{type, payload}` action.
    ///
    /// ## Errors
    /// - [`CoreError::MissingActionType`] if `type` is absent or not a string
    /// - [`CoreError::MalformedAction`] if a recognised type carries a
    ///   payload of the wrong shape
    pub fn from_value(value: &Value) -> CoreResult<Action> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(CoreError::MissingActionType)?;
        let payload = value.get("payload").cloned().unwrap_or(Value::Null);

        let action = match kind {
            "SETTINGS_SET_FASTMOVE" => Action::SettingsSetFastMove(decode(kind, payload)?),
            "SETTINGS_SET_THEME" => Action::SettingsSetTheme(decode(kind, payload)?),
            "SETTINGS_SET_COLUMNS" => Action::SettingsSetColumns(decode(kind, payload)?),
            "SETTINGS_SET_CURRENCY" => match payload {
                Value::Bool(true) => Action::SettingsSetCurrency(None),
                other => Action::SettingsSetCurrency(Some(decode(kind, other)?)),
            },
            "SETTINGS_SET_STEAMLOGINSHOW" => {
                Action::SettingsSetSteamLoginShow(decode(kind, payload)?)
            }
            "SETTINGS_SET_SOURCE" => Action::SettingsSetSource(decode(kind, payload)?),
            "SETTINGS_SET_LOCALE" => Action::SettingsSetLocale(decode(kind, payload)?),
            "SETTINGS_SET_OS" => Action::SettingsSetOs(decode(kind, payload)?),
            "SETTINGS_SET_DEVMODE" => Action::SettingsSetDevmode(decode(kind, payload)?),
            "SETTINGS_SET_OVERVIEW" => Action::SettingsSetOverview(decode(kind, payload)?),
            "SETTINGS_ADD_CURRENCYPRICE" => {
                Action::SettingsAddCurrencyPrice(decode(kind, payload)?)
            }

            "TRADEUP_ADD_REMOVE" => {
                require_field(kind, &payload, "item_id")?;
                Action::TradeUpAddRemove(decode(kind, payload)?)
            }
            "TRADEUP_ADDREMOVE_COLLECTION" => {
                Action::TradeUpAddRemoveCollection(decode(kind, payload)?)
            }
            "TRADEUP_ADDREMOVE_OPTION" => Action::TradeUpAddRemoveOption(decode(kind, payload)?),
            "TRADEUP_SET_SEARCH" => {
                Action::TradeUpSetSearch(decode::<SearchPayload>(kind, payload)?.search_field)
            }
            "TRADEUP_SET_MIN" => Action::TradeUpSetMin(decode(kind, payload)?),
            "TRADEUP_SET_MAX" => Action::TradeUpSetMax(decode(kind, payload)?),
            "TRADEUP_SET_POSSIBLE" => Action::TradeUpSetPossible(decode(kind, payload)?),
            "TRADEUP_RESET" => Action::TradeUpReset,

            "SET_FILTERED" => Action::SetFiltered(decode(kind, payload)?),
            "SET_FILTERED_STORAGE" => Action::SetFilteredStorage(decode(kind, payload)?),
            "ALL_BUT_CLEAR" => Action::AllButClear(decode(kind, payload)?),
            "INVENTORY_STORAGES_SET_SORT_STORAGES" => Action::SetSortStorages(
                decode::<SortedStoragePayload>(kind, payload)?.storage_filtered,
            ),
            "CLEAR_ALL" => Action::ClearAll,
            "INVENTORY_ADD_CATEGORY_FILTER" => Action::AddCategoryFilter(payload),
            "INVENTORY_ADD_RARITY_FILTER" => Action::AddRarityFilter(payload),
            "INVENTORY_FILTERS_SET_SEARCH" => {
                Action::FiltersSetSearch(decode::<SearchPayload>(kind, payload)?.search_field)
            }
            "SET_SORT" => Action::SetSort(decode::<SortPayload>(kind, payload)?.sort_value),

            "INVENTORY_SET_INVENTORY" => Action::InventorySetInventory(decode(kind, payload)?),
            "INVENTORY_SET_ITEMS_LOOKUP" => {
                Action::InventorySetItemsLookUp(decode(kind, payload)?)
            }
            "INVENTORY_STORAGES_ADD_TO" => Action::StoragesAddTo(decode(kind, payload)?),
            "INVENTORY_STORAGES_CLEAR_CASKET" => {
                Action::StoragesClearCasket(decode::<CasketPayload>(kind, payload)?.casket_id)
            }
            "INVENTORY_STORAGES_CLEAR_ALL" => Action::StoragesClearAll,

            "MOVE_FROM_ADD_REMOVE_STORAGE" => {
                Action::MoveFromAddRemoveStorage(decode(kind, payload)?)
            }
            "MOVE_TO_ADD_REMOVE_STORAGE" => Action::MoveToAddRemoveStorage(decode(kind, payload)?),
            "MOVE_FROM_ADD_TO" => {
                require_field(kind, &payload, "item_id")?;
                Action::MoveFromAddTo(decode(kind, payload)?)
            }
            "MOVE_TO_ADD_TO" => {
                require_field(kind, &payload, "item_id")?;
                Action::MoveToAddTo(decode(kind, payload)?)
            }
            "MOVE_FROM_CLEAR" => Action::MoveFromClear,
            "MOVE_FROM_CLEAR_ALL" => Action::MoveFromClearAll,
            "MOVE_TO_CLEAR_ALL" => Action::MoveToClearAll,

            "MODAL_MOVE_SET_PAYLOAD" => Action::ModalMoveSetPayload(decode(kind, payload)?),
            "MODAL_MOVE_ADD_QUERY" => Action::ModalMoveAddQuery(payload),
            "MODAL_MOVE_DO_CANCEL" => Action::ModalMoveDoCancel(payload),
            "MODAL_MOVE_CLEAR_FROM" => Action::ModalMoveClearFrom(decode(kind, payload)?),
            "MODAL_MOVE_RESET" => Action::ModalMoveReset,

            "MODAL_TRADE_OPEN" => Action::ModalTradeOpen(decode(kind, payload)?),
            "MODAL_TRADE_RESET" => Action::ModalTradeReset,

            "PRICING_ADD_TO_REQUESTED" => Action::PricingAddToRequested(decode(kind, payload)?),
            "PRICING_ADD" => Action::PricingAdd(decode(kind, payload)?),
            "PRICING_CLEAR_REQUESTED" => Action::PricingClearRequested,

            "SIGN_OUT" => Action::SignOut,

            other => Action::Unknown(other.to_string()),
        };

        Ok(action)
    }

    /// Returns the wire `type` string of this action.
    pub fn action_type(&self) -> &str {
        match self {
            Action::SettingsSetFastMove(_) => "SETTINGS_SET_FASTMOVE",
            Action::SettingsSetTheme(_) => "SETTINGS_SET_THEME",
            Action::SettingsSetColumns(_) => "SETTINGS_SET_COLUMNS",
            Action::SettingsSetCurrency(_) => "SETTINGS_SET_CURRENCY",
            Action::SettingsSetSteamLoginShow(_) => "SETTINGS_SET_STEAMLOGINSHOW",
            Action::SettingsSetSource(_) => "SETTINGS_SET_SOURCE",
            Action::SettingsSetLocale(_) => "SETTINGS_SET_LOCALE",
            Action::SettingsSetOs(_) => "SETTINGS_SET_OS",
            Action::SettingsSetDevmode(_) => "SETTINGS_SET_DEVMODE",
            Action::SettingsSetOverview(_) => "SETTINGS_SET_OVERVIEW",
            Action::SettingsAddCurrencyPrice(_) => "SETTINGS_ADD_CURRENCYPRICE",
            Action::TradeUpAddRemove(_) => "TRADEUP_ADD_REMOVE",
            Action::TradeUpAddRemoveCollection(_) => "TRADEUP_ADDREMOVE_COLLECTION",
            Action::TradeUpAddRemoveOption(_) => "TRADEUP_ADDREMOVE_OPTION",
            Action::TradeUpSetSearch(_) => "TRADEUP_SET_SEARCH",
            Action::TradeUpSetMin(_) => "TRADEUP_SET_MIN",
            Action::TradeUpSetMax(_) => "TRADEUP_SET_MAX",
            Action::TradeUpSetPossible(_) => "TRADEUP_SET_POSSIBLE",
            Action::TradeUpReset => "TRADEUP_RESET",
            Action::SetFiltered(_) => "SET_FILTERED",
            Action::SetFilteredStorage(_) => "SET_FILTERED_STORAGE",
            Action::AllButClear(_) => "ALL_BUT_CLEAR",
            Action::SetSortStorages(_) => "INVENTORY_STORAGES_SET_SORT_STORAGES",
            Action::ClearAll => "CLEAR_ALL",
            Action::AddCategoryFilter(_) => "INVENTORY_ADD_CATEGORY_FILTER",
            Action::AddRarityFilter(_) => "INVENTORY_ADD_RARITY_FILTER",
            Action::FiltersSetSearch(_) => "INVENTORY_FILTERS_SET_SEARCH",
            Action::SetSort(_) => "SET_SORT",
            Action::InventorySetInventory(_) => "INVENTORY_SET_INVENTORY",
            Action::InventorySetItemsLookUp(_) => "INVENTORY_SET_ITEMS_LOOKUP",
            Action::StoragesAddTo(_) => "INVENTORY_STORAGES_ADD_TO",
            Action::StoragesClearCasket(_) => "INVENTORY_STORAGES_CLEAR_CASKET",
            Action::StoragesClearAll => "INVENTORY_STORAGES_CLEAR_ALL",
            Action::MoveFromAddRemoveStorage(_) => "MOVE_FROM_ADD_REMOVE_STORAGE",
            Action::MoveToAddRemoveStorage(_) => "MOVE_TO_ADD_REMOVE_STORAGE",
            Action::MoveFromAddTo(_) => "MOVE_FROM_ADD_TO",
            Action::MoveToAddTo(_) => "MOVE_TO_ADD_TO",
            Action::MoveFromClear => "MOVE_FROM_CLEAR",
            Action::MoveFromClearAll => "MOVE_FROM_CLEAR_ALL",
            Action::MoveToClearAll => "MOVE_TO_CLEAR_ALL",
            Action::ModalMoveSetPayload(_) => "MODAL_MOVE_SET_PAYLOAD",
            Action::ModalMoveAddQuery(_) => "MODAL_MOVE_ADD_QUERY",
            Action::ModalMoveDoCancel(_) => "MODAL_MOVE_DO_CANCEL",
            Action::ModalMoveClearFrom(_) => "MODAL_MOVE_CLEAR_FROM",
            Action::ModalMoveReset => "MODAL_MOVE_RESET",
            Action::ModalTradeOpen(_) => "MODAL_TRADE_OPEN",
            Action::ModalTradeReset => "MODAL_TRADE_RESET",
            Action::PricingAddToRequested(_) => "PRICING_ADD_TO_REQUESTED",
            Action::PricingAdd(_) => "PRICING_ADD",
            Action::PricingClearRequested => "PRICING_CLEAR_REQUESTED",
            Action::SignOut => "SIGN_OUT",
            Action::Unknown(kind) => kind,
        }
    }
}

fn decode<T: DeserializeOwned>(kind: &str, payload: Value) -> CoreResult<T> {
    serde_json::from_value(payload).map_err(|e| CoreError::malformed(kind, e.to_string()))
}

fn require_field(kind: &str, payload: &Value, field: &str) -> CoreResult<()> {
    match payload.get(field) {
        Some(Value::Null) | None => Err(CoreError::malformed(
            kind,
            format!("missing field `{}`", field),
        )),
        Some(_) => Ok(()),
    }
}
