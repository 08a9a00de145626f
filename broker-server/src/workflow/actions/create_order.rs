//! CreateOrder command handler
//!
//! Opens a new order for the issuing client. The order id and the
//! human-readable reference are pre-generated by the manager before the
//! write transaction starts.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::workflow::{Notification, NotificationKind, OrderRecord, Role};

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// CreateOrder action
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    /// Pre-generated order id
    pub order_id: String,
    /// Pre-generated order reference
    pub reference: String,
    pub total_price: Decimal,
}

#[async_trait]
impl CommandHandler for CreateOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        if metadata.actor.role != Role::Client {
            return Err(WorkflowError::Forbidden(
                "only clients can create orders".to_string(),
            ));
        }

        if self.total_price < Decimal::ZERO {
            return Err(WorkflowError::Validation(
                "total_price must not be negative".to_string(),
            ));
        }

        let mut order = OrderRecord::new(
            &self.order_id,
            &self.reference,
            &metadata.actor.id,
            self.total_price,
        );
        order.created_at = ctx.now;

        // Alert the admin pool that an unclaimed order exists
        ctx.emit_alert(Notification::new(
            &self.order_id,
            NotificationKind::OrderCreated,
            None,
            format!("New order {} awaiting supervisor", self.reference),
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
    use shared::workflow::{Actor, OrderStatus, ADMIN_RECIPIENT};

    fn create_test_metadata(actor: Actor) -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            actor,
            timestamp: 1234567890,
        }
    }

    #[tokio::test]
    async fn test_create_order_success() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 1234567890);

        let action = CreateOrderAction {
            order_id: "ord-1".to_string(),
            reference: "ORD2026010110001".to_string(),
            total_price: Decimal::new(50000, 2),
        };

        let metadata = create_test_metadata(Actor::client("client-1"));
        let outcome = action.execute(&mut ctx, &metadata).await.unwrap();
        assert_eq!(outcome.order_id.as_deref(), Some("ord-1"));

        let order = ctx.load_order("ord-1").unwrap();
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.client_id, "client-1");
        assert_eq!(order.reference, "ORD2026010110001");
        assert_eq!(order.version, 1);

        let alerts = ctx.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, NotificationKind::OrderCreated);
        assert_eq!(alerts[0].recipient_key(), ADMIN_RECIPIENT);
    }

    #[tokio::test]
    async fn test_create_order_rejects_staff() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = CreateOrderAction {
            order_id: "ord-1".to_string(),
            reference: "ORD2026010110001".to_string(),
            total_price: Decimal::ZERO,
        };

        let metadata = create_test_metadata(Actor::supervisor("sup-1"));
        let err = action.execute(&mut ctx, &metadata).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_order_rejects_negative_price() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = CreateOrderAction {
            order_id: "ord-1".to_string(),
            reference: "ORD2026010110001".to_string(),
            total_price: Decimal::new(-100, 2),
        };

        let metadata = create_test_metadata(Actor::client("client-1"));
        let err = action.execute(&mut ctx, &metadata).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }
}
