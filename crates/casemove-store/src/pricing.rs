//! # Pricing Service
//!
//! Owns the active provider feed and answers price requests over channels.
//!
//! ## Channels
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PriceRequester ──► ChannelPriceBridge ──(requests)──► PricingService   │
//! │                                                          │              │
//! │                          handle_items / handle_trade_up  │              │
//! │                                                          ▼              │
//! │  AppStore.dispatch(PRICING_ADD) ◄──────(results)──── PricingBatch      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are always answered, even before a feed is loaded: unknown items
//! come back priced at zero. Each request carries the [`BatchKind`] of the
//! bridge that sent it, and the answer keeps that kind.

use casemove_core::pricing::{FeedOutcome, FeedSource, PriceBridge, PriceFeed};
use casemove_core::{Action, ItemRow};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::Path;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Bridge
// =============================================================================

/// One batch of rows to price, tagged with how it should be answered.
#[derive(Debug, Clone)]
pub struct PriceRequest {
    pub kind: BatchKind,
    pub rows: Vec<ItemRow>,
}

/// Forwards request batches to a [`PricingService`].
///
/// Sending never blocks. If the service is gone the batch is dropped with a
/// warning, and the keys stay marked as requested.
#[derive(Debug, Clone)]
pub struct ChannelPriceBridge {
    tx: UnboundedSender<PriceRequest>,
    kind: BatchKind,
}

impl ChannelPriceBridge {
    /// A bridge for inventory rows.
    pub fn new(tx: UnboundedSender<PriceRequest>) -> Self {
        ChannelPriceBridge {
            tx,
            kind: BatchKind::Inventory,
        }
    }

    /// A bridge on the same channel whose requests are priced as trade-up rows.
    pub fn for_trade_up(&self) -> Self {
        ChannelPriceBridge {
            tx: self.tx.clone(),
            kind: BatchKind::TradeUp,
        }
    }

    pub fn kind(&self) -> BatchKind {
        self.kind
    }
}

impl PriceBridge for ChannelPriceBridge {
    fn request_price(&self, rows: &[ItemRow]) {
        let request = PriceRequest {
            kind: self.kind,
            rows: rows.to_vec(),
        };
        if self.tx.send(request).is_err() {
            warn!(count = rows.len(), kind = ?self.kind, "Pricing service is gone, dropping price request");
        }
    }
}

/// Creates a connected inventory bridge and request receiver.
pub fn request_channel() -> (ChannelPriceBridge, UnboundedReceiver<PriceRequest>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelPriceBridge::new(tx), rx)
}

// =============================================================================
// Results
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Inventory,
    TradeUp,
}

/// Rows with `pricing` attached, ready for `PRICING_ADD`.
#[derive(Debug, Clone)]
pub struct PricingBatch {
    pub kind: BatchKind,
    pub rows: Vec<ItemRow>,
    /// Feed the prices came from, `None` if no feed was loaded.
    pub source: Option<FeedSource>,
    pub priced_at: DateTime<Utc>,
}

impl PricingBatch {
    pub fn into_action(self) -> Action {
        Action::PricingAdd(self.rows)
    }
}

// =============================================================================
// Service
// =============================================================================

pub struct PricingService {
    feed: PriceFeed,
    backup: Option<Value>,
    results: UnboundedSender<PricingBatch>,
}

impl PricingService {
    pub fn new(results: UnboundedSender<PricingBatch>) -> Self {
        PricingService {
            feed: PriceFeed::new(),
            backup: None,
            results,
        }
    }

    /// Builds the service from configuration, loading the backup payload
    /// when one is configured. A configured but unreadable backup is an error.
    pub async fn from_config(
        config: &StoreConfig,
        results: UnboundedSender<PricingBatch>,
    ) -> StoreResult<Self> {
        let service = Self::new(results);
        match config.backup_path() {
            Some(path) => Ok(service.with_backup(Self::load_backup(path).await?)),
            None => {
                debug!("No pricing backup configured");
                Ok(service)
            }
        }
    }

    /// Uses `backup` whenever a fetched payload is rejected.
    pub fn with_backup(mut self, backup: Value) -> Self {
        self.backup = Some(backup);
        self
    }

    /// Reads the bundled last-known-good payload from disk.
    pub async fn load_backup(path: &Path) -> StoreResult<Value> {
        let contents = tokio::fs::read_to_string(path).await?;
        let backup: Value = serde_json::from_str(&contents)?;
        info!(?path, "Loaded pricing backup");
        Ok(backup)
    }

    /// Installs the backup as the active feed, e.g. before the first fetch.
    pub fn use_backup(&mut self) -> FeedOutcome {
        match self.backup.clone() {
            Some(backup) => self.feed.set_pricing(backup, FeedSource::Backup, None),
            None => FeedOutcome::Rejected,
        }
    }

    pub fn feed(&self) -> &PriceFeed {
        &self.feed
    }

    /// Validates and installs a fetched payload.
    pub fn set_pricing(&mut self, payload: Value, source: FeedSource) -> FeedOutcome {
        let outcome = self.feed.set_pricing(payload, source, self.backup.as_ref());
        match outcome {
            FeedOutcome::Accepted => info!(entries = self.feed.len(), ?source, "Pricing feed updated"),
            FeedOutcome::FellBackToBackup => warn!("Pricing payload invalid, using backup"),
            FeedOutcome::Rejected => warn!("Pricing payload invalid and no backup, keeping previous"),
        }
        outcome
    }

    /// Prices moveable, named rows and emits the whole batch.
    pub fn handle_items(&self, mut rows: Vec<ItemRow>) -> StoreResult<()> {
        self.feed.handle_items(&mut rows);
        self.emit(BatchKind::Inventory, rows)
    }

    /// Prices every row and emits the batch.
    pub fn handle_trade_up(&self, mut rows: Vec<ItemRow>) -> StoreResult<()> {
        self.feed.handle_trade_up(&mut rows);
        self.emit(BatchKind::TradeUp, rows)
    }

    fn emit(&self, kind: BatchKind, rows: Vec<ItemRow>) -> StoreResult<()> {
        debug!(?kind, count = rows.len(), "Emitting priced rows");
        let batch = PricingBatch {
            kind,
            rows,
            source: self.feed.source(),
            priced_at: Utc::now(),
        };
        self.results
            .send(batch)
            .map_err(|_| StoreError::ChannelClosed("pricing results"))
    }

    /// Answers request batches until every bridge is dropped.
    pub async fn run(self, mut requests: UnboundedReceiver<PriceRequest>) -> StoreResult<()> {
        info!(loaded = self.feed.is_loaded(), "Pricing service started");
        while let Some(request) = requests.recv().await {
            match request.kind {
                BatchKind::Inventory => self.handle_items(request.rows)?,
                BatchKind::TradeUp => self.handle_trade_up(request.rows)?,
            }
        }
        info!("Pricing service stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "Glock-18 | Fade (Factory New)": {
                "steam": { "last_24h": 1500.0 },
                "buff163": { "starting_at": { "price": 1300.0 } }
            }
        })
    }

    fn moveable(id: &str) -> ItemRow {
        ItemRow::new(id, "Glock-18 | Fade")
            .with_wear("Factory New")
            .with("item_moveable", true)
    }

    #[tokio::test]
    async fn test_requests_are_answered() {
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let mut service = PricingService::new(results_tx);
        assert_eq!(service.set_pricing(payload(), FeedSource::Normal), FeedOutcome::Accepted);

        let (bridge, requests) = request_channel();
        let handle = tokio::spawn(service.run(requests));

        bridge.request_price(&[moveable("1")]);
        let batch = results_rx.recv().await.unwrap();
        assert_eq!(batch.kind, BatchKind::Inventory);
        assert_eq!(batch.source, Some(FeedSource::Normal));
        assert_eq!(batch.rows[0].pricing().unwrap().steam_listing, 1500.0);

        drop(bridge);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_invalid_payload_falls_back_to_backup() {
        let (results_tx, _results_rx) = mpsc::unbounded_channel();
        let mut service = PricingService::new(results_tx).with_backup(payload());

        let outcome = service.set_pricing(json!("<html>503</html>"), FeedSource::Normal);
        assert_eq!(outcome, FeedOutcome::FellBackToBackup);
        assert_eq!(service.feed().source(), Some(FeedSource::Backup));
    }

    #[tokio::test]
    async fn test_trade_up_bridge_is_answered_as_trade_up() {
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let mut service = PricingService::new(results_tx);
        service.set_pricing(payload(), FeedSource::Normal);

        let (bridge, requests) = request_channel();
        let trade_up = bridge.for_trade_up();
        let handle = tokio::spawn(service.run(requests));

        let fixed = ItemRow::new("2", "Glock-18 | Fade").with_wear("Factory New");
        trade_up.request_price(&[fixed.clone()]);
        bridge.request_price(&[fixed]);

        let first = results_rx.recv().await.unwrap();
        assert_eq!(first.kind, BatchKind::TradeUp);
        assert_eq!(first.rows[0].pricing().unwrap().steam_listing, 1500.0);
        let second = results_rx.recv().await.unwrap();
        assert_eq!(second.kind, BatchKind::Inventory);
        assert!(second.rows[0].pricing().is_none());

        drop(bridge);
        drop(trade_up);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_from_config_loads_backup() {
        let path = std::env::temp_dir().join(format!("casemove-prices-{}.json", std::process::id()));
        tokio::fs::write(&path, payload().to_string()).await.unwrap();
        let mut config = StoreConfig::new();
        config.pricing.backup_path = Some(path.clone());

        let (results_tx, _results_rx) = mpsc::unbounded_channel();
        let mut service = PricingService::from_config(&config, results_tx).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        let outcome = service.set_pricing(json!({ "x": {} }), FeedSource::Normal);
        assert_eq!(outcome, FeedOutcome::FellBackToBackup);
        assert_eq!(service.feed().source(), Some(FeedSource::Backup));
    }

    #[tokio::test]
    async fn test_from_config_without_backup() {
        let (results_tx, _results_rx) = mpsc::unbounded_channel();
        let mut service = PricingService::from_config(&StoreConfig::new(), results_tx)
            .await
            .unwrap();
        let outcome = service.set_pricing(json!({ "x": {} }), FeedSource::Normal);
        assert_eq!(outcome, FeedOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_from_config_missing_backup_file_fails() {
        let mut config = StoreConfig::new();
        config.pricing.backup_path = Some(std::env::temp_dir().join("casemove-no-such-backup.json"));
        let (results_tx, _results_rx) = mpsc::unbounded_channel();
        assert!(PricingService::from_config(&config, results_tx).await.is_err());
    }

    #[tokio::test]
    async fn test_trade_up_prices_unmoveable_rows() {
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let mut service = PricingService::new(results_tx).with_backup(payload());
        assert_eq!(service.use_backup(), FeedOutcome::Accepted);

        let fixed = ItemRow::new("2", "Glock-18 | Fade").with_wear("Factory New");
        service.handle_items(vec![fixed.clone()]).unwrap();
        service.handle_trade_up(vec![fixed]).unwrap();

        let inventory = results_rx.recv().await.unwrap();
        assert!(inventory.rows[0].pricing().is_none());
        let trade_up = results_rx.recv().await.unwrap();
        assert_eq!(trade_up.kind, BatchKind::TradeUp);
        assert!(trade_up.rows[0].pricing().is_some());
    }

    #[tokio::test]
    async fn test_closed_results_channel_is_an_error() {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        drop(results_rx);
        let service = PricingService::new(results_tx);
        let err = service.handle_trade_up(vec![moveable("1")]).unwrap_err();
        assert!(matches!(err, StoreError::ChannelClosed(_)));
    }

    #[test]
    fn test_batch_into_action() {
        let batch = PricingBatch {
            kind: BatchKind::Inventory,
            rows: vec![moveable("1")],
            source: None,
            priced_at: Utc::now(),
        };
        assert!(matches!(batch.into_action(), Action::PricingAdd(rows) if rows.len() == 1));
    }
}
