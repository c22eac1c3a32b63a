//! # Store Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CASEMOVE_DB_PATH=/tmp/casemove.db                                  │
//! │     CASEMOVE_PERSIST_KEY=root                                          │
//! │     CASEMOVE_PRICES_BACKUP=/opt/casemove/prices_backup.json            │
//! │     CASEMOVE_PERSIST_INTERVAL_MS=1000                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/casemove/store.toml (Linux)                              │
//! │     ~/Library/Application Support/com.casemove.casemove/store.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/home/me/.local/share/casemove/casemove.db"
//!
//! [persist]
//! key = "root"
//! interval_ms = 1000
//!
//! [pricing]
//! backup_path = "/opt/casemove/prices_backup.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

/// Default persistence key, the whole state tree lives under it.
pub const DEFAULT_PERSIST_KEY: &str = "root";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite file. Created on first run.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "casemove", "casemove")
        .map(|dirs| dirs.data_dir().join("casemove.db"))
        .unwrap_or_else(|| PathBuf::from("./casemove.db"))
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistSettings {
    /// Row key of the persisted tree.
    #[serde(default = "default_persist_key")]
    pub key: String,

    /// Minimum delay between two writes of the live state (milliseconds).
    #[serde(default = "default_persist_interval")]
    pub interval_ms: u64,
}

fn default_persist_key() -> String {
    DEFAULT_PERSIST_KEY.to_string()
}

fn default_persist_interval() -> u64 {
    1000
}

impl Default for PersistSettings {
    fn default() -> Self {
        PersistSettings {
            key: default_persist_key(),
            interval_ms: default_persist_interval(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Bundled last-known-good provider payload.
    #[serde(default)]
    pub backup_path: Option<PathBuf>,
}

// =============================================================================
// Main Store Configuration
// =============================================================================

/// Complete store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub persist: PersistSettings,

    #[serde(default)]
    pub pricing: PricingSettings,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (store.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                config = Self::from_toml(&std::fs::read_to_string(&path)?)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> StoreResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Store config saved");
        Ok(())
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig("database.path must not be empty".into()));
        }
        if self.persist.key.trim().is_empty() {
            return Err(StoreError::InvalidConfig("persist.key must not be empty".into()));
        }
        Ok(())
    }

    /// Applies environment overrides, reading variables through `var`.
    ///
    /// Unparseable numbers are ignored with a warning.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("CASEMOVE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(key) = var("CASEMOVE_PERSIST_KEY") {
            self.persist.key = key;
        }

        if let Some(path) = var("CASEMOVE_PRICES_BACKUP") {
            debug!(path = %path, "Overriding pricing backup from environment");
            self.pricing.backup_path = Some(PathBuf::from(path));
        }

        if let Some(interval) = var("CASEMOVE_PERSIST_INTERVAL_MS") {
            match interval.parse::<u64>() {
                Ok(ms) => self.persist.interval_ms = ms,
                Err(_) => warn!(value = %interval, "Ignoring invalid CASEMOVE_PERSIST_INTERVAL_MS"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "casemove", "casemove")
            .map(|dirs| dirs.config_dir().join("store.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn database_path(&self) -> &Path {
        &self.database.path
    }

    pub fn persist_key(&self) -> &str {
        &self.persist.key
    }

    pub fn persist_interval(&self) -> Duration {
        Duration::from_millis(self.persist.interval_ms)
    }

    pub fn backup_path(&self) -> Option<&Path> {
        self.pricing.backup_path.as_deref()
    }
}
