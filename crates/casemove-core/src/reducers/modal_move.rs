//! Move-progress modal slice.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::shape::{self, normalize_from_value, object_or_empty, Lenient};
use crate::state::Normalize;
use crate::types::ModalPayload;

const KNOWN: &[&str] = &["storageIdsToClearFrom", "doCancel", "query", "modalPayload"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
#[serde(rename_all = "camelCase")]
pub struct ModalMoveState {
    /// Storage units whose cached contents must be refreshed after the move.
    pub storage_ids_to_clear_from: Vec<Lenient<String>>,
    pub do_cancel: Vec<Value>,
    /// Pending move commands, in order.
    pub query: Vec<Value>,
    pub modal_payload: Lenient<ModalPayload>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

normalize_from_value!(ModalMoveState);

impl Default for ModalMoveState {
    fn default() -> Self {
        Self::initial()
    }
}

impl Normalize for ModalMoveState {
    fn normalize(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        ModalMoveState {
            storage_ids_to_clear_from: shape::seq(obj, "storageIdsToClearFrom").unwrap_or_default(),
            do_cancel: shape::seq(obj, "doCancel").unwrap_or_default(),
            query: shape::seq(obj, "query").unwrap_or_default(),
            modal_payload: shape::object_field(obj, "modalPayload")
                .unwrap_or_else(|| Lenient::new(ModalPayload::default())),
            extra: shape::extra(obj, KNOWN),
        }
    }
}

impl ModalMoveState {
    pub fn initial() -> Self {
        ModalMoveState {
            storage_ids_to_clear_from: Vec::new(),
            do_cancel: Vec::new(),
            query: Vec::new(),
            modal_payload: Lenient::new(ModalPayload::default()),
            extra: Map::new(),
        }
    }

    /// Current progress, or the empty payload when the stored one is unreadable.
    pub fn payload(&self) -> ModalPayload {
        self.modal_payload.get().unwrap_or_default()
    }

    pub fn reduce(&self, action: &Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::ModalMoveSetPayload(payload) => next.modal_payload = Lenient::new(payload.clone()),
            Action::ModalMoveAddQuery(query) => next.query.push(query.clone()),
            Action::ModalMoveDoCancel(cancel) => next.do_cancel.push(cancel.clone()),
            Action::ModalMoveClearFrom(storage_id) => {
                let storage_id = Lenient::new(storage_id.clone());
                if !next.storage_ids_to_clear_from.contains(&storage_id) {
                    next.storage_ids_to_clear_from.push(storage_id);
                }
            }
            Action::ModalMoveReset | Action::SignOut => return Self::initial(),
            _ => {}
        }
        next
    }
}
