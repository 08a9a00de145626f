//! WorkflowManager - core command processing
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Pre-generate order id / reference for CreateOrder
//!     ├─ 3. Begin write transaction (re-check idempotency inside)
//!     ├─ 4. Optimistic version check (expected_version)
//!     ├─ 5. Convert command to action and execute
//!     ├─ 6. Persist modified orders / requests / notifications
//!     ├─ 7. Mark command processed
//!     ├─ 8. Commit transaction
//!     ├─ 9. Broadcast alerts
//!     └─ 10. Return response
//! ```

use chrono::Local;
use shared::error::{CommandError, ErrorCode};
use shared::workflow::{
    CommandResponse, DataRequest, Notification, OrderRecord, WorkflowCommand,
    WorkflowCommandPayload,
};
use std::path::Path;
use thiserror::Error;
use tokio::sync::broadcast;

use super::actions::{CreateOrderAction, WorkflowAction};
use super::storage::{StorageError, WorkflowStorage};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, WorkflowError};

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// Map storage failures to a stable error code
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) => ErrorCode::InternalError,
        _ => ErrorCode::StorageFailure,
    }
}

fn workflow_error_code(err: &WorkflowError) -> ErrorCode {
    match err {
        WorkflowError::OrderNotFound(_) => ErrorCode::OrderNotFound,
        WorkflowError::OrderClosed(_) => ErrorCode::OrderClosed,
        WorkflowError::AlreadyAssigned(_) => ErrorCode::AlreadyAssigned,
        WorkflowError::NoSupervisor(_) => ErrorCode::NoSupervisor,
        WorkflowError::NotAssigned(_) => ErrorCode::NotAssigned,
        WorkflowError::NotAssignedToYou(_) => ErrorCode::NotAssignedToYou,
        WorkflowError::NotYourOrder(_) => ErrorCode::NotYourOrder,
        WorkflowError::Forbidden(_) => ErrorCode::Forbidden,
        WorkflowError::ForbiddenTransition(_) => ErrorCode::ForbiddenTransition,
        WorkflowError::RequestNotFound(_) => ErrorCode::RequestNotFound,
        WorkflowError::RequestClosed(_) => ErrorCode::RequestClosed,
        WorkflowError::NotCancellable(_) => ErrorCode::NotCancellable,
        WorkflowError::NoPendingCancellation(_) => ErrorCode::NoPendingCancellation,
        WorkflowError::CancellationPending(_) => ErrorCode::CancellationPending,
        WorkflowError::NotificationNotFound(_) => ErrorCode::NotificationNotFound,
        WorkflowError::Validation(_) => ErrorCode::ValidationFailed,
        WorkflowError::ConcurrentModification(_) => ErrorCode::ConcurrentModification,
        WorkflowError::Storage(_) => ErrorCode::StorageFailure,
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                CommandError::new(code, e.to_string())
            }
            ManagerError::Workflow(e) => CommandError::new(workflow_error_code(&e), e.to_string()),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Alert broadcast channel capacity
const ALERT_CHANNEL_CAPACITY: usize = 4096;

/// WorkflowManager for command processing
///
/// All mutations funnel through one redb write transaction per
/// command, which serializes concurrent submissions; of two racing
/// claims on the same assignment slot exactly one wins.
pub struct WorkflowManager {
    storage: WorkflowStorage,
    alert_tx: broadcast::Sender<Notification>,
}

impl std::fmt::Debug for WorkflowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowManager")
            .field("storage", &"<WorkflowStorage>")
            .finish()
    }
}

impl WorkflowManager {
    /// Create a new WorkflowManager with the given database path
    pub fn new(db_path: impl AsRef<Path>) -> ManagerResult<Self> {
        let storage = WorkflowStorage::open(db_path)?;
        Ok(Self::with_storage(storage))
    }

    /// Create a WorkflowManager with existing storage
    pub fn with_storage(storage: WorkflowStorage) -> Self {
        let (alert_tx, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);
        Self { storage, alert_tx }
    }

    /// Generate the next order reference (crash-safe via redb)
    ///
    /// A counter failure surfaces to the caller; falling back to a
    /// default count would hand out colliding references.
    fn next_order_reference(&self) -> ManagerResult<String> {
        let count = self.storage.next_order_count()?;
        let date_str = Local::now().format("%Y%m%d").to_string();
        Ok(format!("ORD{}{}", date_str, 10000 + count))
    }

    /// Subscribe to alert broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.alert_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &WorkflowStorage {
        &self.storage
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: WorkflowCommand) -> CommandResponse {
        match self.process_command(cmd.clone()) {
            Ok((response, alerts)) => {
                // Broadcast alerts after successful commit; delivery is
                // best-effort, the persisted rows are the source of truth
                for alert in alerts {
                    let _ = self.alert_tx.send(alert);
                }
                response
            }
            Err(err) => CommandResponse::error(cmd.command_id, err.into()),
        }
    }

    /// Process a command and return the response plus emitted alerts
    fn process_command(
        &self,
        cmd: WorkflowCommand,
    ) -> ManagerResult<(CommandResponse, Vec<Notification>)> {
        tracing::info!(command_id = %cmd.command_id, actor = %cmd.actor.id, role = %cmd.actor.role, "Processing command");

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 2. Pre-generate id and reference for CreateOrder (BEFORE the
        // transaction; redb doesn't allow nested write transactions and
        // the counter commits on its own)
        let pre_generated = match &cmd.payload {
            WorkflowCommandPayload::CreateOrder { .. } => {
                let order_id = uuid::Uuid::new_v4().to_string();
                let reference = self.next_order_reference()?;
                tracing::info!(order_id = %order_id, reference = %reference, "Pre-generated order identity");
                Some((order_id, reference))
            }
            _ => None,
        };

        // 3. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within transaction
        if self.storage.is_command_processed_txn(&txn, &cmd.command_id)? {
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 4. Optimistic concurrency assertion against the target order
        if let Some(expected) = cmd.expected_version
            && let Some(order_id) = cmd.payload.order_id()
            && let Some(order) = self.storage.get_order_txn(&txn, order_id)?
            && order.version != expected
        {
            return Err(WorkflowError::ConcurrentModification(format!(
                "order {} is at version {}, expected {}",
                order_id, order.version, expected
            ))
            .into());
        }

        let now = chrono::Utc::now().timestamp_millis();
        let mut ctx = CommandContext::new(&txn, &self.storage, now);
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            actor: cmd.actor.clone(),
            timestamp: cmd.timestamp,
        };

        // 5. Convert to action and execute
        let action: WorkflowAction = match &cmd.payload {
            WorkflowCommandPayload::CreateOrder { total_price } => {
                let (order_id, reference) =
                    pre_generated.expect("order identity must be pre-generated for CreateOrder");
                WorkflowAction::CreateOrder(CreateOrderAction {
                    order_id,
                    reference,
                    total_price: *total_price,
                })
            }
            _ => (&cmd).into(),
        };
        let outcome = futures::executor::block_on(action.execute(&mut ctx, &metadata))
            .map_err(ManagerError::from)?;

        // 6. Collect the context's buffers, then release its borrows
        let orders: Vec<OrderRecord> = ctx.modified_orders().cloned().collect();
        let requests: Vec<DataRequest> = ctx.modified_data_requests().cloned().collect();
        let notifications: Vec<Notification> = ctx.modified_notifications().cloned().collect();
        let alerts: Vec<Notification> = ctx.alerts().to_vec();
        drop(ctx);

        // 7. Persist modified records and maintain the open-order index
        for order in &orders {
            self.storage.store_order(&txn, order)?;
            if order.is_closed() {
                self.storage.mark_order_closed(&txn, &order.order_id)?;
            } else {
                self.storage.mark_order_open(&txn, &order.order_id)?;
            }
        }
        for request in &requests {
            self.storage.store_data_request(&txn, request)?;
        }
        for notification in &notifications {
            self.storage.store_notification(&txn, notification)?;
        }

        // 8. Mark command processed
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // 9. Commit transaction
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            command_id = %cmd.command_id,
            order_id = ?outcome.order_id,
            alert_count = alerts.len(),
            "Command processed successfully"
        );
        Ok((
            CommandResponse::success(cmd.command_id, outcome.order_id),
            alerts,
        ))
    }

    // ========== Public Query Methods ==========

    /// Get an order by id
    pub fn get_order(&self, order_id: &str) -> ManagerResult<Option<OrderRecord>> {
        Ok(self.storage.get_order(order_id)?)
    }

    /// Get all non-terminal orders
    pub fn get_open_orders(&self) -> ManagerResult<Vec<OrderRecord>> {
        Ok(self.storage.get_open_orders()?)
    }

    /// Get a data request by id
    pub fn get_data_request(&self, request_id: &str) -> ManagerResult<Option<DataRequest>> {
        Ok(self.storage.get_data_request(request_id)?)
    }

    /// Get all data requests for an order, oldest first
    pub fn get_requests_for_order(&self, order_id: &str) -> ManagerResult<Vec<DataRequest>> {
        Ok(self.storage.get_requests_for_order(order_id)?)
    }

    /// Get a notification by id
    pub fn get_notification(&self, notification_id: &str) -> ManagerResult<Option<Notification>> {
        Ok(self.storage.get_notification(notification_id)?)
    }

    /// Get all notifications addressed to a recipient, newest first
    pub fn get_notifications_for_recipient(
        &self,
        recipient: &str,
    ) -> ManagerResult<Vec<Notification>> {
        Ok(self.storage.get_notifications_for_recipient(recipient)?)
    }
}

impl Clone for WorkflowManager {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            alert_tx: self.alert_tx.clone(),
        }
    }
}
