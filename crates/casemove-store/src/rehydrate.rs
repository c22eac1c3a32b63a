//! # Rehydration
//!
//! Restores the persisted tree into a live [`RootState`] at startup.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  persisted_state["root"]                                               │
//! │       │  load (None on first run → null)                               │
//! │       ▼                                                                 │
//! │  migrate(blob) ─── sanitize_persisted_state, exactly once              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RootState::from_persisted ─── every slice normalizer                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppStore (first dispatch happens only after this returns)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A legacy non-object payload survives `migrate` untouched and then
//! normalizes to the initial state, since none of its slices can be read.

use casemove_core::{sanitize_with_report, RootState, SanitizeReport};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::repository::PersistedStateRepository;

/// The persistence layer's migration hook.
///
/// Runs the sanitizer synchronously and resolves immediately.
pub async fn migrate(blob: Value) -> Value {
    migrate_with_report(&blob).await.0
}

/// [`migrate`], also returning what was repaired.
///
/// Every load path goes through here, so the hook and startup rehydration
/// heal a stored tree identically.
pub async fn migrate_with_report(blob: &Value) -> (Value, SanitizeReport) {
    let (sanitized, report) = sanitize_with_report(blob);
    if !report.is_clean() {
        info!(
            slices = ?report.healed_slices(),
            repairs = report.healed.len(),
            "Healed persisted state"
        );
    }
    (sanitized, report)
}

/// Outcome of [`Persistor::rehydrate`].
#[derive(Debug, Clone)]
pub struct Rehydrated {
    pub state: RootState,
    /// What the sanitizer repaired on the way in.
    pub report: SanitizeReport,
    /// `false` on first run.
    pub found: bool,
}

/// Loads and saves the live state under one persistence key.
#[derive(Debug, Clone)]
pub struct Persistor {
    repo: PersistedStateRepository,
    key: String,
}

impl Persistor {
    pub fn new(repo: PersistedStateRepository, key: impl Into<String>) -> Self {
        Persistor {
            repo,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads, sanitizes and normalizes the stored tree.
    pub async fn rehydrate(&self) -> StoreResult<Rehydrated> {
        let stored = self.repo.load(&self.key).await?;
        let found = stored.is_some();
        let blob = stored.unwrap_or(Value::Null);

        let (sanitized, report) = migrate_with_report(&blob).await;
        let state = RootState::from_persisted(&sanitized);
        debug!(key = %self.key, found, repairs = report.healed.len(), "Rehydrated state");

        Ok(Rehydrated {
            state,
            report,
            found,
        })
    }

    /// Writes the live state back.
    pub async fn persist(&self, state: &RootState) -> StoreResult<()> {
        self.repo.save(&self.key, &state.to_value()).await
    }

    /// Forgets the stored tree, e.g. on sign-out.
    pub async fn purge(&self) -> StoreResult<bool> {
        self.repo.purge(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::persisted::UNVERSIONED;
    use casemove_core::shape::Lenient;
    use serde_json::json;

    async fn persistor() -> Persistor {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Persistor::new(db.persisted_state(), "root")
    }

    #[tokio::test]
    async fn test_migrate_null_resolves_to_empty_object() {
        assert_eq!(migrate(Value::Null).await, json!({}));
        assert_eq!(migrate(json!("legacy")).await, json!("legacy"));
    }

    #[tokio::test]
    async fn test_rehydrate_matches_migrate_hook() {
        let blob = json!({
            "settingsReducer": { "columns": null, "theme": 5 },
            "moveToReducer": "nope",
            "futureReducer": { "x": 1 }
        });
        let persistor = persistor().await;
        persistor.repo.save("root", &blob).await.unwrap();

        let rehydrated = persistor.rehydrate().await.unwrap();
        let (migrated, report) = migrate_with_report(&blob).await;
        assert_eq!(rehydrated.report, report);
        assert_eq!(rehydrated.state, RootState::from_persisted(&migrate(blob).await));
        let restored = rehydrated.state.to_value();
        assert_eq!(restored["settingsReducer"]["theme"], migrated["settingsReducer"]["theme"]);
        assert_eq!(restored["moveToReducer"], migrated["moveToReducer"]);
        assert_eq!(restored["futureReducer"], json!({ "x": 1 }));
    }

    #[tokio::test]
    async fn test_first_run_is_initial_state() {
        let rehydrated = persistor().await.rehydrate().await.unwrap();
        assert!(!rehydrated.found);
        assert_eq!(rehydrated.state, RootState::default());
    }

    #[tokio::test]
    async fn test_corrupt_state_is_healed() {
        let persistor = persistor().await;
        persistor
            .repo
            .save(
                "root",
                &json!({
                    "_persist": { "version": -1, "rehydrated": true },
                    "settingsReducer": { "columns": null, "theme": "light" },
                    "tradeUpReducer": "garbage"
                }),
            )
            .await
            .unwrap();

        let rehydrated = persistor.rehydrate().await.unwrap();
        assert!(rehydrated.found);
        assert!(rehydrated.report.healed_slices().contains(&"settingsReducer"));
        assert_eq!(rehydrated.state.settings.theme, "light");
        assert_eq!(rehydrated.state.settings.columns.len(), 6);
        assert!(rehydrated.state.trade_up.trade_up_products.is_empty());
        assert!(rehydrated.state.extra.contains_key("_persist"));
    }

    #[tokio::test]
    async fn test_persist_keeps_stored_rows_verbatim() {
        let persistor = persistor().await;
        let row = json!({
            "item_id": 27348,
            "item_paint_wear": "0.25",
            "pricing": { "buff163": null, "steam_listing": 1.5, "csfloat": 2.0 }
        });
        persistor
            .repo
            .save(
                "root",
                &json!({
                    "inventoryReducer": { "inventory": [row.clone()] },
                    "settingsReducer": { "columns": ["Price", 5, "Storage"] }
                }),
            )
            .await
            .unwrap();

        let rehydrated = persistor.rehydrate().await.unwrap();
        persistor.persist(&rehydrated.state).await.unwrap();

        let stored = persistor.repo.load("root").await.unwrap().unwrap();
        assert_eq!(stored["inventoryReducer"]["inventory"], json!([row]));
        assert_eq!(stored["settingsReducer"]["columns"], json!(["Price", 5, "Storage"]));
    }

    #[tokio::test]
    async fn test_legacy_text_payload_yields_initial_state() {
        let persistor = persistor().await;
        persistor
            .repo
            .save_raw("root", "not json at all", UNVERSIONED)
            .await
            .unwrap();

        let rehydrated = persistor.rehydrate().await.unwrap();
        assert!(rehydrated.found);
        assert!(rehydrated.report.is_clean());
        assert_eq!(rehydrated.state, RootState::default());
    }

    #[tokio::test]
    async fn test_persist_then_rehydrate_is_clean() {
        let persistor = persistor().await;
        let mut state = RootState::default();
        state.settings.theme = Lenient::new("light".to_string());
        persistor.persist(&state).await.unwrap();

        let rehydrated = persistor.rehydrate().await.unwrap();
        assert!(rehydrated.report.is_clean());
        assert_eq!(rehydrated.state, state);
    }
}
