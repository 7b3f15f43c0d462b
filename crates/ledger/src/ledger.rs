//! Durable order ledger.
//!
//! Every placed order is recorded here before the engine moves on, and the
//! whole ledger is rewritten to disk on each mutation so a crash between
//! ticks loses nothing. The on-disk format is a pretty-printed JSON object
//! keyed by order id.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use survivor_core::types::{Order, OrderStatus, TransactionType};

/// Errors from ledger persistence.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Order has an empty order id")]
    MissingOrderId,
}

/// In-memory order book of record, mirrored to a JSON file.
///
/// `record` is an upsert: replaying the same order id replaces the earlier
/// entry, so a retried placement that produced the same id stays a single
/// row. The most recently recorded order is tracked as the current order;
/// after a reload the entry with the latest timestamp takes that role.
#[derive(Debug)]
pub struct OrderLedger {
    path: PathBuf,
    orders: HashMap<String, Order>,
    completed: HashSet<String>,
    completed_by_type: HashMap<TransactionType, u32>,
    current: Option<String>,
}

impl OrderLedger {
    /// Opens the ledger at `path`, loading any prior session's orders.
    ///
    /// A missing or empty file starts a fresh ledger. An unreadable or
    /// corrupt file also starts fresh, with the failure logged; the engine
    /// must keep trading even when history is lost.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let orders = match Self::read_orders(&path) {
            Ok(Some(orders)) => {
                info!(path = %path.display(), count = orders.len(), "Loaded order ledger");
                orders
            }
            Ok(None) => {
                info!(path = %path.display(), "No order ledger found, starting fresh");
                HashMap::new()
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load order ledger, starting fresh"
                );
                HashMap::new()
            }
        };

        let mut ledger = Self {
            path,
            orders,
            completed: HashSet::new(),
            completed_by_type: HashMap::new(),
            current: None,
        };
        ledger.rebuild_derived_state();
        ledger
    }

    fn read_orders(path: &Path) -> Result<Option<HashMap<String, Order>>, LedgerError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Rebuilds completion bookkeeping and the current order from loaded
    /// entries. Entries without a timestamp never become current.
    fn rebuild_derived_state(&mut self) {
        for (id, order) in &self.orders {
            if order.status == OrderStatus::Completed {
                self.completed.insert(id.clone());
                *self
                    .completed_by_type
                    .entry(order.transaction_type)
                    .or_insert(0) += 1;
            }
        }
        self.current = self
            .orders
            .values()
            .filter_map(|o| o.timestamp.map(|ts| (ts, &o.order_id)))
            .max_by(|(ts_a, id_a), (ts_b, id_b)| ts_a.cmp(ts_b).then(id_a.cmp(id_b)))
            .map(|(_, id)| id.clone());
    }

    /// Records an order and rewrites the ledger file.
    ///
    /// Stamps the current time when the order carries no timestamp. The
    /// in-memory entry is kept even when the rewrite fails, so the caller
    /// can retry persistence without losing the order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingOrderId`] for an empty order id, or a
    /// persistence error from the file rewrite.
    pub fn record(&mut self, mut order: Order) -> Result<(), LedgerError> {
        if order.order_id.is_empty() {
            return Err(LedgerError::MissingOrderId);
        }
        if order.timestamp.is_none() {
            order.timestamp = Some(Utc::now());
        }

        let order_id = order.order_id.clone();
        if let Some(previous) = self.orders.insert(order_id.clone(), order) {
            warn!(
                order_id = %order_id,
                previous_status = %previous.status,
                "Order id already in ledger, overwriting"
            );
        }
        self.current = Some(order_id.clone());

        self.persist()?;
        debug!(order_id = %order_id, total = self.orders.len(), "Order recorded");
        Ok(())
    }

    /// Marks an order completed and rewrites the ledger file.
    ///
    /// Returns `false` for an unknown id. Completing an already completed
    /// order is a no-op that still returns `true`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the file rewrite.
    pub fn complete(&mut self, order_id: &str) -> Result<bool, LedgerError> {
        if self.completed.contains(order_id) {
            info!(order_id, "Order already completed");
            return Ok(true);
        }
        let Some(order) = self.orders.get_mut(order_id) else {
            error!(order_id, "Cannot complete unknown order id");
            return Ok(false);
        };

        order.status = OrderStatus::Completed;
        let transaction_type = order.transaction_type;
        self.completed.insert(order_id.to_string());
        *self
            .completed_by_type
            .entry(transaction_type)
            .or_insert(0) += 1;

        self.persist()?;
        info!(order_id, transaction_type = %transaction_type, "Order completed");
        Ok(true)
    }

    /// Rewrites the whole ledger file in place.
    fn persist(&self) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.orders)?;
        debug!(path = %self.path.display(), orders = self.orders.len(), "Ledger persisted");
        Ok(())
    }

    /// The most recently recorded order, if any.
    #[must_use]
    pub fn current_order(&self) -> Option<&Order> {
        self.current.as_deref().and_then(|id| self.orders.get(id))
    }

    #[must_use]
    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Orders still awaiting completion.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders
            .values()
            .filter(|o| o.status == OrderStatus::Placed)
    }

    pub fn completed_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders
            .values()
            .filter(|o| o.status == OrderStatus::Completed)
    }

    /// How many orders of this transaction type have completed.
    #[must_use]
    pub fn completed_count(&self, transaction_type: TransactionType) -> u32 {
        self.completed_by_type
            .get(&transaction_type)
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn temp_ledger() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("artifacts").join("orders_data.json");
        (dir, path)
    }

    fn make_order(order_id: &str, quantity: u32) -> Order {
        Order {
            order_id: order_id.to_string(),
            symbol: "NIFTY24AUG19500PE".to_string(),
            transaction_type: TransactionType::Sell,
            quantity,
            price: Some(dec!(12.5)),
            timestamp: None,
            status: OrderStatus::Placed,
        }
    }

    // ==================== Load Tests ====================

    #[test]
    fn open_missing_file_starts_fresh() {
        let (_dir, path) = temp_ledger();
        let ledger = OrderLedger::open(&path);
        assert!(ledger.is_empty());
        assert!(ledger.current_order().is_none());
    }

    #[test]
    fn open_empty_file_starts_fresh() {
        let (_dir, path) = temp_ledger();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        let ledger = OrderLedger::open(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn open_corrupt_file_starts_fresh() {
        let (_dir, path) = temp_ledger();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let ledger = OrderLedger::open(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn open_rebuilds_completion_counts() {
        let (_dir, path) = temp_ledger();
        {
            let mut ledger = OrderLedger::open(&path);
            ledger.record(make_order("A", 75)).unwrap();
            ledger.record(make_order("B", 150)).unwrap();
            assert!(ledger.complete("A").unwrap());
        }

        let reloaded = OrderLedger::open(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.completed_count(TransactionType::Sell), 1);
        assert_eq!(reloaded.open_orders().count(), 1);
        assert_eq!(reloaded.completed_orders().count(), 1);
    }

    #[test]
    fn open_skips_untimestamped_entries_for_current() {
        let (_dir, path) = temp_ledger();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        // Hand-written file in the pre-timestamp format plus one stamped entry.
        fs::write(
            &path,
            r#"{
                "OLD": {
                    "order_id": "OLD",
                    "symbol": "NIFTY24AUG19500PE",
                    "transaction_type": "SELL",
                    "quantity": 75
                },
                "NEW": {
                    "order_id": "NEW",
                    "symbol": "NIFTY24AUG19600CE",
                    "transaction_type": "SELL",
                    "quantity": 75,
                    "timestamp": "2024-08-29T09:15:00Z"
                }
            }"#,
        )
        .unwrap();

        let ledger = OrderLedger::open(&path);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.current_order().unwrap().order_id, "NEW");
    }

    // ==================== Record Tests ====================

    #[test]
    fn record_then_reload_roundtrip() {
        let (_dir, path) = temp_ledger();
        {
            let mut ledger = OrderLedger::open(&path);
            ledger.record(make_order("240819000001", 75)).unwrap();
            ledger.record(make_order("240819000002", 150)).unwrap();
        }

        let reloaded = OrderLedger::open(&path);
        assert_eq!(reloaded.len(), 2);
        let order = reloaded.get("240819000002").unwrap();
        assert_eq!(order.quantity, 150);
        assert_eq!(order.price, Some(dec!(12.5)));
        assert_eq!(order.status, OrderStatus::Placed);
    }

    #[test]
    fn record_rejects_empty_order_id() {
        let (_dir, path) = temp_ledger();
        let mut ledger = OrderLedger::open(&path);
        let result = ledger.record(make_order("", 75));
        assert!(matches!(result, Err(LedgerError::MissingOrderId)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn record_stamps_missing_timestamp() {
        let (_dir, path) = temp_ledger();
        let mut ledger = OrderLedger::open(&path);
        ledger.record(make_order("A", 75)).unwrap();
        assert!(ledger.get("A").unwrap().timestamp.is_some());
    }

    #[test]
    fn record_preserves_given_timestamp() {
        let (_dir, path) = temp_ledger();
        let mut ledger = OrderLedger::open(&path);
        let stamped = Utc::now() - Duration::hours(3);
        let mut order = make_order("A", 75);
        order.timestamp = Some(stamped);
        ledger.record(order).unwrap();
        assert_eq!(ledger.get("A").unwrap().timestamp, Some(stamped));
    }

    #[test]
    fn record_overwrites_duplicate_id() {
        let (_dir, path) = temp_ledger();
        let mut ledger = OrderLedger::open(&path);
        ledger.record(make_order("A", 75)).unwrap();
        ledger.record(make_order("A", 150)).unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get("A").unwrap().quantity, 150);
    }

    #[test]
    fn current_order_is_last_recorded_but_latest_stamped_on_reload() {
        let (_dir, path) = temp_ledger();
        let earlier = Utc::now() - Duration::hours(2);
        let later = Utc::now() - Duration::hours(1);
        {
            let mut ledger = OrderLedger::open(&path);
            let mut first = make_order("LATER", 75);
            first.timestamp = Some(later);
            let mut second = make_order("EARLIER", 75);
            second.timestamp = Some(earlier);

            ledger.record(first).unwrap();
            ledger.record(second).unwrap();
            // Within a session the last write wins regardless of timestamps.
            assert_eq!(ledger.current_order().unwrap().order_id, "EARLIER");
        }

        // Across a restart only the timestamps survive to pick the current.
        let reloaded = OrderLedger::open(&path);
        assert_eq!(reloaded.current_order().unwrap().order_id, "LATER");
    }

    // ==================== Complete Tests ====================

    #[test]
    fn complete_unknown_order_returns_false() {
        let (_dir, path) = temp_ledger();
        let mut ledger = OrderLedger::open(&path);
        assert!(!ledger.complete("GHOST").unwrap());
    }

    #[test]
    fn complete_marks_order_and_counts_once() {
        let (_dir, path) = temp_ledger();
        let mut ledger = OrderLedger::open(&path);
        ledger.record(make_order("A", 75)).unwrap();

        assert!(ledger.complete("A").unwrap());
        assert_eq!(ledger.get("A").unwrap().status, OrderStatus::Completed);
        assert_eq!(ledger.completed_count(TransactionType::Sell), 1);

        // Duplicate completion stays a success without double counting.
        assert!(ledger.complete("A").unwrap());
        assert_eq!(ledger.completed_count(TransactionType::Sell), 1);
    }

    // ==================== File Format Tests ====================

    #[test]
    fn ledger_file_is_pretty_json_keyed_by_order_id() {
        let (_dir, path) = temp_ledger();
        let mut ledger = OrderLedger::open(&path);
        ledger.record(make_order("240819000001", 75)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains('\n'), "expected pretty-printed output");

        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let entry = &value["240819000001"];
        assert_eq!(entry["order_id"], "240819000001");
        assert_eq!(entry["transaction_type"], "SELL");
        assert_eq!(entry["status"], "PLACED");
        assert!(entry["timestamp"].is_string());
    }
}
