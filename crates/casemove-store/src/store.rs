//! # Live Store
//!
//! Holds the rehydrated [`RootState`] and runs every dispatched action
//! through the core reducers.
//!
//! ## Persistence Throttle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  dispatch ──► reduce ──► dirty                                         │
//! │                             │                                           │
//! │              interval since last write elapsed?                        │
//! │                 ├── yes → write now                                     │
//! │                 └── no  → wait for the next dispatch or flush()         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes happen under the state lock, so the stored tree never goes back
//! in time.

use casemove_core::{Action, RootState, SanitizeReport};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::pool::{Database, DbConfig};
use crate::rehydrate::Persistor;

struct Inner {
    state: RootState,
    dirty: bool,
    last_write: Option<Instant>,
}

impl Inner {
    fn write_due(&self, interval: Duration) -> bool {
        self.dirty
            && self
                .last_write
                .map_or(true, |at| at.elapsed() >= interval)
    }
}

pub struct AppStore {
    inner: Mutex<Inner>,
    persistor: Persistor,
    interval: Duration,
}

impl AppStore {
    /// Opens the configured database and rehydrates from it.
    pub async fn open(config: &StoreConfig) -> StoreResult<(Self, SanitizeReport)> {
        let db = Database::new(DbConfig::new(config.database_path())).await?;
        let persistor = Persistor::new(db.persisted_state(), config.persist_key());
        Self::rehydrate(persistor, config.persist_interval()).await
    }

    /// Builds a store from whatever `persistor` has stored.
    pub async fn rehydrate(
        persistor: Persistor,
        interval: Duration,
    ) -> StoreResult<(Self, SanitizeReport)> {
        let rehydrated = persistor.rehydrate().await?;
        let store = AppStore {
            inner: Mutex::new(Inner {
                state: rehydrated.state,
                dirty: false,
                last_write: None,
            }),
            persistor,
            interval,
        };
        Ok((store, rehydrated.report))
    }

    /// Reduces `action` into the live state.
    pub async fn dispatch(&self, action: Action) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.state = inner.state.reduce(&action);
        inner.dirty = true;
        debug!(action = action.action_type(), "Dispatched");

        if let Action::Unknown(kind) = &action {
            debug!(action = %kind, "No reducer handles this action");
        }

        if inner.write_due(self.interval) {
            self.write(&mut inner).await?;
        }
        Ok(())
    }

    /// Parses an untyped `{type, payload}` action, then dispatches it.
    pub async fn dispatch_value(&self, raw: &Value) -> StoreResult<()> {
        let action = Action::from_value(raw).map_err(|e| {
            warn!(error = %e, "Rejected malformed action");
            e
        })?;
        self.dispatch(action).await
    }

    pub async fn snapshot(&self) -> RootState {
        self.inner.lock().await.state.clone()
    }

    /// Writes pending changes regardless of the throttle.
    pub async fn flush(&self) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.dirty {
            self.write(&mut inner).await?;
        }
        Ok(())
    }

    async fn write(&self, inner: &mut Inner) -> StoreResult<()> {
        self.persistor.persist(&inner.state).await?;
        inner.dirty = false;
        inner.last_write = Some(Instant::now());
        Ok(())
    }
}
