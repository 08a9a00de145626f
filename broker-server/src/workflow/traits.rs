//! Command execution context and handler trait
//!
//! Actions mutate workflow state through a [`CommandContext`] scoped to
//! a single redb write transaction. Nothing an action does is visible
//! until the manager persists the context's modified records and
//! commits; a rejected action simply drops the transaction.

use async_trait::async_trait;
use redb::WriteTransaction;
use shared::workflow::{Actor, DataRequest, Notification, OrderRecord};
use std::collections::HashMap;
use thiserror::Error;

use super::storage::{StorageError, WorkflowStorage};

/// Workflow-level errors produced by actions
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order is closed: {0}")]
    OrderClosed(String),

    #[error("Assignment slot already taken: {0}")]
    AlreadyAssigned(String),

    #[error("Order has no supervisor: {0}")]
    NoSupervisor(String),

    #[error("Order has no delegate: {0}")]
    NotAssigned(String),

    #[error("Order is assigned to another staff member: {0}")]
    NotAssignedToYou(String),

    #[error("Order is owned by another party: {0}")]
    NotYourOrder(String),

    #[error("Operation not permitted for this role: {0}")]
    Forbidden(String),

    #[error("Transition not permitted: {0}")]
    ForbiddenTransition(String),

    #[error("Data request not found: {0}")]
    RequestNotFound(String),

    #[error("Data request is closed: {0}")]
    RequestClosed(String),

    #[error("Order cannot be cancelled: {0}")]
    NotCancellable(String),

    #[error("No pending cancellation request: {0}")]
    NoPendingCancellation(String),

    #[error("Cancellation request already pending: {0}")]
    CancellationPending(String),

    #[error("Notification not found: {0}")]
    NotificationNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Version conflict: {0}")]
    ConcurrentModification(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for WorkflowError {
    fn from(err: StorageError) -> Self {
        WorkflowError::Storage(err.to_string())
    }
}

/// Metadata accompanying every command execution
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub actor: Actor,
    /// Unix millis
    pub timestamp: i64,
}

/// Per-command mutation buffer over one write transaction
///
/// Records loaded through the context reflect earlier saves within the
/// same command. Saved orders get their `version` bumped and
/// `updated_at` stamped; the manager persists everything on success.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a WorkflowStorage,
    /// Unix millis; all timestamps written by the command use this
    pub now: i64,
    modified_orders: HashMap<String, OrderRecord>,
    modified_requests: HashMap<String, DataRequest>,
    modified_notifications: HashMap<String, Notification>,
    alerts: Vec<Notification>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a WorkflowStorage, now: i64) -> Self {
        Self {
            txn,
            storage,
            now,
            modified_orders: HashMap::new(),
            modified_requests: HashMap::new(),
            modified_notifications: HashMap::new(),
            alerts: Vec::new(),
        }
    }

    // ========== Orders ==========

    pub fn load_order(&self, order_id: &str) -> Result<OrderRecord, WorkflowError> {
        if let Some(order) = self.modified_orders.get(order_id) {
            return Ok(order.clone());
        }
        self.storage
            .get_order_txn(self.txn, order_id)?
            .ok_or_else(|| WorkflowError::OrderNotFound(order_id.to_string()))
    }

    /// Buffer an order mutation, bumping its version and update stamp
    pub fn save_order(&mut self, mut order: OrderRecord) {
        order.version += 1;
        order.updated_at = self.now;
        self.modified_orders.insert(order.order_id.clone(), order);
    }

    pub fn modified_orders(&self) -> impl Iterator<Item = &OrderRecord> {
        self.modified_orders.values()
    }

    // ========== Data Requests ==========

    pub fn load_data_request(&self, request_id: &str) -> Result<DataRequest, WorkflowError> {
        if let Some(request) = self.modified_requests.get(request_id) {
            return Ok(request.clone());
        }
        self.storage
            .get_data_request_txn(self.txn, request_id)?
            .ok_or_else(|| WorkflowError::RequestNotFound(request_id.to_string()))
    }

    /// All data requests for an order, oldest first, reflecting earlier
    /// saves within the same command
    pub fn load_requests_for_order(
        &self,
        order_id: &str,
    ) -> Result<Vec<DataRequest>, WorkflowError> {
        let mut requests = self
            .storage
            .get_requests_for_order_txn(self.txn, order_id)?;
        for request in &mut requests {
            if let Some(buffered) = self.modified_requests.get(&request.request_id) {
                *request = buffered.clone();
            }
        }
        for buffered in self.modified_requests.values() {
            if buffered.order_id == order_id
                && !requests.iter().any(|r| r.request_id == buffered.request_id)
            {
                requests.push(buffered.clone());
            }
        }
        requests.sort_by_key(|r| r.created_at);
        Ok(requests)
    }

    pub fn save_data_request(&mut self, request: DataRequest) {
        self.modified_requests
            .insert(request.request_id.clone(), request);
    }

    pub fn modified_data_requests(&self) -> impl Iterator<Item = &DataRequest> {
        self.modified_requests.values()
    }

    // ========== Notifications ==========

    pub fn load_notification(&self, notification_id: &str) -> Result<Notification, WorkflowError> {
        if let Some(notification) = self.modified_notifications.get(notification_id) {
            return Ok(notification.clone());
        }
        self.storage
            .get_notification_txn(self.txn, notification_id)?
            .ok_or_else(|| WorkflowError::NotificationNotFound(notification_id.to_string()))
    }

    /// Buffer a notification mutation without broadcasting it
    pub fn save_notification(&mut self, notification: Notification) {
        self.modified_notifications
            .insert(notification.notification_id.clone(), notification);
    }

    /// Buffer a new notification and queue it for broadcast after commit
    pub fn emit_alert(&mut self, notification: Notification) {
        self.alerts.push(notification.clone());
        self.save_notification(notification);
    }

    pub fn modified_notifications(&self) -> impl Iterator<Item = &Notification> {
        self.modified_notifications.values()
    }

    pub fn alerts(&self) -> &[Notification] {
        &self.alerts
    }
}

/// Result of a successful action
#[derive(Debug, Default)]
pub struct ActionOutcome {
    /// Order the action acted on, echoed in the response
    pub order_id: Option<String>,
}

impl ActionOutcome {
    pub fn order(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
        }
    }
}

/// One command type, one handler
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError>;
}
