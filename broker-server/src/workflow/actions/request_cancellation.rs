//! RequestCancellation command handler
//!
//! The order's client asks for cancellation. The request parks in the
//! order's single pending slot with a snapshot of the current status,
//! and the responsible staff member is alerted. The order status itself
//! does not move until the request is resolved.

use async_trait::async_trait;
use shared::workflow::{CancellationRequest, Notification, NotificationKind, Role};

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// RequestCancellation action
#[derive(Debug, Clone)]
pub struct RequestCancellationAction {
    pub order_id: String,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for RequestCancellationAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        if metadata.actor.role != Role::Client {
            return Err(WorkflowError::Forbidden(
                "only clients can request cancellation".to_string(),
            ));
        }

        let mut order = ctx.load_order(&self.order_id)?;
        if order.client_id != metadata.actor.id {
            return Err(WorkflowError::NotYourOrder(self.order_id.clone()));
        }
        if !order.status.is_cancellable() {
            return Err(WorkflowError::NotCancellable(format!(
                "order {} is {}",
                self.order_id, order.status
            )));
        }
        if order.has_pending_cancellation() {
            return Err(WorkflowError::CancellationPending(self.order_id.clone()));
        }

        order.cancellation = Some(CancellationRequest {
            requested_by: metadata.actor.id.clone(),
            requested_at: ctx.now,
            previous_status: order.status,
            reason: self.reason.clone(),
        });

        ctx.emit_alert(Notification::new(
            &self.order_id,
            NotificationKind::CancellationRequested,
            order.assigned_supervisor_id.clone(),
            format!("Client requested cancellation of order {}", order.reference),
        ));

        ctx.save_order(order);
        Ok(ActionOutcome::order(&self.order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::storage::WorkflowStorage;
    use crate::workflow::traits::CommandContext;
    use rust_decimal::Decimal;
    use shared::workflow::{Actor, OrderRecord, OrderStatus, ADMIN_RECIPIENT};

    fn seed_order(storage: &WorkflowStorage, status: OrderStatus, supervisor: Option<&str>) {
        let txn = storage.begin_write().unwrap();
        let mut order = OrderRecord::new("ord-1", "ORD2026010110001", "client-1", Decimal::ZERO);
        order.status = status;
        order.assigned_supervisor_id = supervisor.map(str::to_string);
        storage.store_order(&txn, &order).unwrap();
        txn.commit().unwrap();
    }

    fn metadata_for(actor: Actor) -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            actor,
            timestamp: 1234567890,
        }
    }

    #[tokio::test]
    async fn test_client_requests_cancellation() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed_order(&storage, OrderStatus::InProgress, Some("sup-1"));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 6_000);

        let action = RequestCancellationAction {
            order_id: "ord-1".to_string(),
            reason: Some("no longer needed".to_string()),
        };
        action
            .execute(&mut ctx, &metadata_for(Actor::client("client-1")))
            .await
            .unwrap();

        let order = ctx.load_order("ord-1").unwrap();
        // Status holds until resolution
        assert_eq!(order.status, OrderStatus::InProgress);
        let pending = order.cancellation.unwrap();
        assert_eq!(pending.previous_status, OrderStatus::InProgress);
        assert_eq!(pending.requested_at, 6_000);
        assert_eq!(pending.reason.as_deref(), Some("no longer needed"));

        let alerts = ctx.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, NotificationKind::CancellationRequested);
        assert_eq!(alerts[0].recipient_key(), "sup-1");
    }

    #[tokio::test]
    async fn test_unsupervised_order_alerts_admin_pool() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed_order(&storage, OrderStatus::New, None);
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = RequestCancellationAction {
            order_id: "ord-1".to_string(),
            reason: None,
        };
        action
            .execute(&mut ctx, &metadata_for(Actor::client("client-1")))
            .await
            .unwrap();

        assert_eq!(ctx.alerts()[0].recipient_key(), ADMIN_RECIPIENT);
    }

    #[tokio::test]
    async fn test_foreign_client_rejected() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed_order(&storage, OrderStatus::InProgress, Some("sup-1"));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = RequestCancellationAction {
            order_id: "ord-1".to_string(),
            reason: None,
        };
        let err = action
            .execute(&mut ctx, &metadata_for(Actor::client("client-2")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotYourOrder(_)));
    }

    #[tokio::test]
    async fn test_terminal_order_not_cancellable() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed_order(&storage, OrderStatus::Completed, Some("sup-1"));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = RequestCancellationAction {
            order_id: "ord-1".to_string(),
            reason: None,
        };
        let err = action
            .execute(&mut ctx, &metadata_for(Actor::client("client-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotCancellable(_)));
    }

    #[tokio::test]
    async fn test_second_request_rejected_while_pending() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed_order(&storage, OrderStatus::InProgress, Some("sup-1"));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let meta = metadata_for(Actor::client("client-1"));
        let action = RequestCancellationAction {
            order_id: "ord-1".to_string(),
            reason: None,
        };
        action.execute(&mut ctx, &meta).await.unwrap();

        let err = action.execute(&mut ctx, &meta).await.unwrap_err();
        assert!(matches!(err, WorkflowError::CancellationPending(_)));
    }
}
