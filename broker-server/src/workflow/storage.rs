//! redb-based storage layer for workflow state
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `OrderRecord` | Current order state |
//! | `open_orders` | `order_id` | `()` | Non-terminal order index |
//! | `data_requests` | `request_id` | `DataRequest` | Data-request records |
//! | `order_requests` | `(order_id, request_id)` | `()` | Per-order request index |
//! | `notifications` | `notification_id` | `Notification` | Staff notifications |
//! | `recipient_notifications` | `(recipient, notification_id)` | `()` | Per-recipient index |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//! | `counters` | name | `u64` | Order reference counter |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: once `commit()` returns
//! the change survives power loss, and the file is always in a
//! consistent state. The write transaction is the serialization point
//! for all workflow mutations.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::workflow::{DataRequest, Notification, OrderRecord};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Current order state: key = order_id, value = JSON-serialized OrderRecord
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Non-terminal order index: key = order_id, value = empty (existence check)
const OPEN_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("open_orders");

/// Data requests: key = request_id, value = JSON-serialized DataRequest
const DATA_REQUESTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("data_requests");

/// Per-order data-request index: key = (order_id, request_id)
const ORDER_REQUESTS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("order_requests");

/// Notifications: key = notification_id, value = JSON-serialized Notification
const NOTIFICATIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("notifications");

/// Per-recipient notification index: key = (recipient, notification_id)
const RECIPIENT_NOTIFICATIONS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("recipient_notifications");

/// Processed command ids: key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

/// Named counters: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_COUNT_KEY: &str = "order_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Workflow storage backed by redb
#[derive(Clone)]
pub struct WorkflowStorage {
    db: Arc<Database>,
}

impl WorkflowStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(db)
    }

    fn init_tables(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(OPEN_ORDERS_TABLE)?;
            let _ = write_txn.open_table(DATA_REQUESTS_TABLE)?;
            let _ = write_txn.open_table(ORDER_REQUESTS_TABLE)?;
            let _ = write_txn.open_table(NOTIFICATIONS_TABLE)?;
            let _ = write_txn.open_table(RECIPIENT_NOTIFICATIONS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ORDER_COUNT_KEY)?.is_none() {
                counters.insert(ORDER_COUNT_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Order Counter (for order reference) ==========

    /// Get and increment the order count atomically
    ///
    /// Runs in its own transaction; redb does not allow nested write
    /// transactions, so callers must invoke this before opening the
    /// command transaction. Returns the NEW count after increment.
    pub fn next_order_count(&self) -> StorageResult<u64> {
        let txn = self.db.begin_write()?;
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(ORDER_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(ORDER_COUNT_KEY, next)?;
        drop(table);
        txn.commit()?;
        Ok(next)
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Order Operations ==========

    /// Store an order record
    pub fn store_order(&self, txn: &WriteTransaction, order: &OrderRecord) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get an order by id
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<OrderRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by id (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderRecord>> {
        let table = txn.open_table(ORDERS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Open Orders ==========

    /// Mark an order as open (non-terminal)
    pub fn mark_order_open(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    /// Remove an order from the open index
    pub fn mark_order_closed(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Check if an order is open
    pub fn is_order_open(&self, order_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OPEN_ORDERS_TABLE)?;
        Ok(table.get(order_id)?.is_some())
    }

    /// Get all open order records
    pub fn get_open_orders(&self) -> StorageResult<Vec<OrderRecord>> {
        let read_txn = self.db.begin_read()?;
        let open_table = read_txn.open_table(OPEN_ORDERS_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in open_table.iter()? {
            let (key, _) = result?;
            if let Some(value) = orders_table.get(key.value())? {
                orders.push(serde_json::from_slice(value.value())?);
            }
        }

        Ok(orders)
    }

    // ========== Data Requests ==========

    /// Store a data request and maintain the per-order index
    pub fn store_data_request(
        &self,
        txn: &WriteTransaction,
        request: &DataRequest,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(DATA_REQUESTS_TABLE)?;
        let value = serde_json::to_vec(request)?;
        table.insert(request.request_id.as_str(), value.as_slice())?;

        let mut index = txn.open_table(ORDER_REQUESTS_TABLE)?;
        index.insert((request.order_id.as_str(), request.request_id.as_str()), ())?;
        Ok(())
    }

    /// Get a data request by id
    pub fn get_data_request(&self, request_id: &str) -> StorageResult<Option<DataRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DATA_REQUESTS_TABLE)?;

        match table.get(request_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a data request by id (within transaction)
    pub fn get_data_request_txn(
        &self,
        txn: &WriteTransaction,
        request_id: &str,
    ) -> StorageResult<Option<DataRequest>> {
        let table = txn.open_table(DATA_REQUESTS_TABLE)?;

        match table.get(request_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all data requests for an order, oldest first
    pub fn get_requests_for_order(&self, order_id: &str) -> StorageResult<Vec<DataRequest>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ORDER_REQUESTS_TABLE)?;
        let table = read_txn.open_table(DATA_REQUESTS_TABLE)?;

        let range_start = (order_id, "");
        let range_end = (order_id, "\u{10FFFF}");

        let mut requests = Vec::new();
        for result in index.range(range_start..=range_end)? {
            let (key, _) = result?;
            let (_, request_id) = key.value();
            if let Some(value) = table.get(request_id)? {
                requests.push(serde_json::from_slice::<DataRequest>(value.value())?);
            }
        }

        requests.sort_by_key(|r| r.created_at);
        Ok(requests)
    }

    /// Get all data requests for an order, oldest first (within transaction)
    pub fn get_requests_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Vec<DataRequest>> {
        let index = txn.open_table(ORDER_REQUESTS_TABLE)?;
        let table = txn.open_table(DATA_REQUESTS_TABLE)?;

        let range_start = (order_id, "");
        let range_end = (order_id, "\u{10FFFF}");

        let mut requests = Vec::new();
        for result in index.range(range_start..=range_end)? {
            let (key, _) = result?;
            let (_, request_id) = key.value();
            if let Some(value) = table.get(request_id)? {
                requests.push(serde_json::from_slice::<DataRequest>(value.value())?);
            }
        }

        requests.sort_by_key(|r| r.created_at);
        Ok(requests)
    }

    // ========== Notifications ==========

    /// Store a notification and maintain the per-recipient index
    pub fn store_notification(
        &self,
        txn: &WriteTransaction,
        notification: &Notification,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(NOTIFICATIONS_TABLE)?;
        let value = serde_json::to_vec(notification)?;
        table.insert(notification.notification_id.as_str(), value.as_slice())?;

        let mut index = txn.open_table(RECIPIENT_NOTIFICATIONS_TABLE)?;
        index.insert(
            (
                notification.recipient_key(),
                notification.notification_id.as_str(),
            ),
            (),
        )?;
        Ok(())
    }

    /// Get a notification by id
    pub fn get_notification(&self, notification_id: &str) -> StorageResult<Option<Notification>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NOTIFICATIONS_TABLE)?;

        match table.get(notification_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a notification by id (within transaction)
    pub fn get_notification_txn(
        &self,
        txn: &WriteTransaction,
        notification_id: &str,
    ) -> StorageResult<Option<Notification>> {
        let table = txn.open_table(NOTIFICATIONS_TABLE)?;

        match table.get(notification_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all notifications for a recipient, newest first
    pub fn get_notifications_for_recipient(
        &self,
        recipient: &str,
    ) -> StorageResult<Vec<Notification>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(RECIPIENT_NOTIFICATIONS_TABLE)?;
        let table = read_txn.open_table(NOTIFICATIONS_TABLE)?;

        let range_start = (recipient, "");
        let range_end = (recipient, "\u{10FFFF}");

        let mut notifications = Vec::new();
        for result in index.range(range_start..=range_end)? {
            let (key, _) = result?;
            let (_, notification_id) = key.value();
            if let Some(value) = table.get(notification_id)? {
                notifications.push(serde_json::from_slice::<Notification>(value.value())?);
            }
        }

        notifications.sort_by_key(|n| std::cmp::Reverse(n.created_at));
        Ok(notifications)
    }
}
