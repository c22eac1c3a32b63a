//! Trade-up confirmation modal slice.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::shape::{self, normalize_from_value, object_or_empty};
use crate::state::Normalize;
use crate::types::ItemRow;

const KNOWN: &[&str] = &["inventoryFirst", "rowToMatch"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
#[serde(rename_all = "camelCase")]
pub struct ModalTradeState {
    pub inventory_first: Vec<ItemRow>,
    pub row_to_match: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

normalize_from_value!(ModalTradeState);

impl Normalize for ModalTradeState {
    fn normalize(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        ModalTradeState {
            inventory_first: shape::seq(obj, "inventoryFirst").unwrap_or_default(),
            row_to_match: shape::mapping(obj, "rowToMatch").unwrap_or_default(),
            extra: shape::extra(obj, KNOWN),
        }
    }
}

impl ModalTradeState {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn reduce(&self, action: &Action) -> Self {
        match action {
            Action::ModalTradeOpen(modal) => ModalTradeState {
                inventory_first: modal.inventory_first.clone(),
                row_to_match: modal.row_to_match.clone(),
                extra: self.extra.clone(),
            },
            Action::ModalTradeReset | Action::SignOut => Self::initial(),
            _ => self.clone(),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.row_to_match.is_empty()
    }
}
