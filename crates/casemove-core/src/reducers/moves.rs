//! # Storage Move Slices
//!
//! `moveFromReducer` (storage unit → inventory) and `moveToReducer`
//! (inventory → storage unit) share one shape and differ only in which
//! actions they answer to.
//!
//! ```text
//! MoveDirection::From  answers  MOVE_FROM_*  (+ MOVE_FROM_CLEAR)
//! MoveDirection::To    answers  MOVE_TO_*
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::shape::{self, id_key, lenient_id, normalize_from_value, object_or_empty, Lenient};
use crate::state::Normalize;

const KNOWN: &[&str] = &["activeStorages", "totalToMove"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    From,
    To,
}

/// One queued transfer: how many of an item to move.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferEntry {
    #[serde(default, deserialize_with = "lenient_id")]
    pub item_id: String,
    #[serde(rename = "toMove", default)]
    pub quantity: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
#[serde(rename_all = "camelCase")]
pub struct MoveState {
    /// Storage unit ids selected as source or target.
    pub active_storages: Vec<Lenient<String>>,
    /// Queued [`TransferEntry`] objects, kept as stored.
    pub total_to_move: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

normalize_from_value!(MoveState);

impl Normalize for MoveState {
    fn normalize(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        MoveState {
            active_storages: shape::seq(obj, "activeStorages").unwrap_or_default(),
            total_to_move: shape::seq(obj, "totalToMove").unwrap_or_default(),
            extra: shape::extra(obj, KNOWN),
        }
    }
}

impl MoveState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn reduce(&self, direction: MoveDirection, action: &Action) -> Self {
        let mut next = self.clone();
        match (direction, action) {
            (MoveDirection::From, Action::MoveFromAddRemoveStorage(id))
            | (MoveDirection::To, Action::MoveToAddRemoveStorage(id)) => {
                shape::toggle(&mut next.active_storages, Lenient::new(id.clone()))
            }
            (MoveDirection::From, Action::MoveFromAddTo(entry))
            | (MoveDirection::To, Action::MoveToAddTo(entry)) => next.upsert(entry),
            (MoveDirection::From, Action::MoveFromClear) => next.total_to_move.clear(),
            (MoveDirection::From, Action::MoveFromClearAll)
            | (MoveDirection::To, Action::MoveToClearAll)
            | (_, Action::SignOut) => return Self::initial(),
            _ => {}
        }
        next
    }

    /// Total number of items queued.
    pub fn queued_count(&self) -> u64 {
        self.total_to_move
            .iter()
            .filter_map(|e| e.get("toMove").and_then(Value::as_u64))
            .sum()
    }

    /// Queued entries that decode as a [`TransferEntry`].
    pub fn entries(&self) -> impl Iterator<Item = TransferEntry> + '_ {
        self.total_to_move
            .iter()
            .filter_map(|e| TransferEntry::deserialize(e).ok())
    }

    fn upsert(&mut self, entry: &TransferEntry) {
        let existing = self
            .total_to_move
            .iter()
            .position(|e| id_key(e.get("item_id")).as_deref() == Some(entry.item_id.as_str()));
        let Ok(value) = serde_json::to_value(entry) else {
            return;
        };
        match (existing, entry.quantity) {
            (Some(index), 0) => {
                self.total_to_move.remove(index);
            }
            (Some(index), _) => self.total_to_move[index] = value,
            (None, 0) => {}
            (None, _) => self.total_to_move.push(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str, quantity: u32) -> TransferEntry {
        TransferEntry {
            item_id: id.to_string(),
            quantity,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_direction_filters_actions() {
        let state = MoveState::initial();
        let from = state.reduce(MoveDirection::From, &Action::MoveToAddRemoveStorage("c1".into()));
        assert!(from.active_storages.is_empty());
        let to = state.reduce(MoveDirection::To, &Action::MoveToAddRemoveStorage("c1".into()));
        assert_eq!(to.active_storages, vec!["c1"]);
    }

    #[test]
    fn test_storage_toggle() {
        let state = MoveState::initial()
            .reduce(MoveDirection::From, &Action::MoveFromAddRemoveStorage("c1".into()))
            .reduce(MoveDirection::From, &Action::MoveFromAddRemoveStorage("c2".into()))
            .reduce(MoveDirection::From, &Action::MoveFromAddRemoveStorage("c1".into()));
        assert_eq!(state.active_storages, vec!["c2"]);
    }

    #[test]
    fn test_upsert_and_remove_by_zero() {
        let state = MoveState::initial()
            .reduce(MoveDirection::To, &Action::MoveToAddTo(entry("a", 3)))
            .reduce(MoveDirection::To, &Action::MoveToAddTo(entry("b", 1)))
            .reduce(MoveDirection::To, &Action::MoveToAddTo(entry("a", 5)));
        assert_eq!(state.queued_count(), 6);

        let state = state.reduce(MoveDirection::To, &Action::MoveToAddTo(entry("a", 0)));
        assert_eq!(state.total_to_move.len(), 1);
        assert_eq!(state.total_to_move[0]["item_id"], json!("b"));
    }

    #[test]
    fn test_clear_keeps_storages() {
        let state = MoveState::initial()
            .reduce(MoveDirection::From, &Action::MoveFromAddRemoveStorage("c1".into()))
            .reduce(MoveDirection::From, &Action::MoveFromAddTo(entry("a", 1)))
            .reduce(MoveDirection::From, &Action::MoveFromClear);
        assert!(state.total_to_move.is_empty());
        assert_eq!(state.active_storages, vec!["c1"]);
    }

    #[test]
    fn test_normalize_keeps_entry_extras() {
        let state = MoveState::normalize(&json!({
            "activeStorages": null,
            "totalToMove": [{ "item_id": 9, "toMove": 2, "storage_id": "c1" }]
        }));
        assert!(state.active_storages.is_empty());
        assert_eq!(state.total_to_move[0]["item_id"], json!(9));
        assert_eq!(state.queued_count(), 2);

        let entries: Vec<TransferEntry> = state.entries().collect();
        assert_eq!(entries[0].item_id, "9");
        assert_eq!(entries[0].extra["storage_id"], json!("c1"));
    }

    #[test]
    fn test_upsert_matches_numeric_ids() {
        let state = MoveState::normalize(&json!({
            "totalToMove": [{ "item_id": 9, "toMove": 2 }]
        }))
        .reduce(MoveDirection::To, &Action::MoveToAddTo(entry("9", 0)));
        assert!(state.total_to_move.is_empty());
    }
}
