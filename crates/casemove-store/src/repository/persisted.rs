//! # Persisted State Repository
//!
//! Reads and writes the serialized state tree, one row per key.
//!
//! ## Row Layout
//! ```text
//! ┌──────────┬───────────────────────────────┬─────────┬──────────────────┐
//! │ key      │ payload (JSON text)           │ version │ updated_at       │
//! ├──────────┼───────────────────────────────┼─────────┼──────────────────┤
//! │ "root"   │ {"settingsReducer":{...},...} │ -1      │ 2026-10-17T...   │
//! └──────────┴───────────────────────────────┴─────────┴──────────────────┘
//! ```
//!
//! Payloads are kept verbatim. A payload that is not JSON (written by a
//! legacy build, or truncated on disk) loads as a JSON *string*, which
//! the sanitizer passes through untouched.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::StoreResult;

/// Version recorded when the tree carries no `_persist.version`.
pub const UNVERSIONED: i64 = -1;

/// A stored row with its payload decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRecord {
    pub key: String,
    pub payload: Value,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PersistedStateRepository {
    pool: SqlitePool,
}

impl PersistedStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PersistedStateRepository { pool }
    }

    /// Loads the payload stored under `key`, `None` on first run.
    pub async fn load(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.load_record(key).await?.map(|record| record.payload))
    }

    /// Loads the full row stored under `key`.
    pub async fn load_record(&self, key: &str) -> StoreResult<Option<PersistedRecord>> {
        let row: Option<(String, i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT payload, version, updated_at FROM persisted_state WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(raw, version, updated_at)| PersistedRecord {
            key: key.to_string(),
            payload: decode_payload(key, raw),
            version,
            updated_at,
        }))
    }

    /// Writes `state` under `key`, replacing any previous row.
    pub async fn save(&self, key: &str, state: &Value) -> StoreResult<()> {
        let payload = serde_json::to_string(state)?;
        self.save_raw(key, &payload, persist_version(state)).await
    }

    /// Writes an already serialized payload. Also used to seed legacy rows.
    pub async fn save_raw(&self, key: &str, payload: &str, version: i64) -> StoreResult<()> {
        debug!(key = %key, bytes = payload.len(), version, "Saving persisted state");

        sqlx::query(
            r#"
            INSERT INTO persisted_state (key, payload, version, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                version = excluded.version,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(payload)
        .bind(version)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes the row under `key`. Returns whether one existed.
    pub async fn purge(&self, key: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM persisted_state WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, removed = result.rows_affected(), "Purged persisted state");
        Ok(result.rows_affected() > 0)
    }

    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM persisted_state ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

fn decode_payload(key: &str, raw: String) -> Value {
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key = %key, error = %e, "Persisted payload is not JSON, passing it through as text");
            Value::String(raw)
        }
    }
}

/// `_persist.version` of a tree, when it is an integer.
fn persist_version(state: &Value) -> i64 {
    state
        .pointer("/_persist/version")
        .and_then(Value::as_i64)
        .unwrap_or(UNVERSIONED)
}
