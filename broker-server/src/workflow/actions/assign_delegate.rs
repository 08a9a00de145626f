//! AssignDelegate command handler
//!
//! The owning supervisor (or an admin) picks the field delegate.
//! Requires a supervisor to be in place first; the delegate slot never
//! changes once set.

use async_trait::async_trait;
use shared::workflow::{OrderStatus, Role};

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// AssignDelegate action
#[derive(Debug, Clone)]
pub struct AssignDelegateAction {
    pub order_id: String,
    pub delegate_id: String,
}

#[async_trait]
impl CommandHandler for AssignDelegateAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        if !matches!(metadata.actor.role, Role::Supervisor | Role::Admin) {
            return Err(WorkflowError::Forbidden(
                "only supervisors and admins can assign a delegate".to_string(),
            ));
        }

        let mut order = ctx.load_order(&self.order_id)?;
        if order.is_closed() {
            return Err(WorkflowError::OrderClosed(self.order_id.clone()));
        }

        let Some(supervisor_id) = order.assigned_supervisor_id.as_deref() else {
            return Err(WorkflowError::NoSupervisor(self.order_id.clone()));
        };
        if metadata.actor.role == Role::Supervisor && metadata.actor.id != supervisor_id {
            return Err(WorkflowError::NotYourOrder(self.order_id.clone()));
        }

        match order.assigned_delegate_id.as_deref() {
            Some(existing) if existing == self.delegate_id => {
                return Ok(ActionOutcome::order(&self.order_id));
            }
            Some(_) => {
                return Err(WorkflowError::AlreadyAssigned(format!(
                    "order {} already has a delegate",
                    self.order_id
                )));
            }
            None => {}
        }

        order.assigned_delegate_id = Some(self.delegate_id.clone());
        order.delegate_assigned_at = Some(ctx.now);
        if order.status == OrderStatus::UnderReview {
            order.status = OrderStatus::Assigned;
        }

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
    use shared::workflow::{Actor, OrderRecord};

    fn seed_supervised_order(storage: &WorkflowStorage, order_id: &str, supervisor: &str) {
        let txn = storage.begin_write().unwrap();
        let mut order = OrderRecord::new(order_id, "ORD2026010110001", "client-1", Decimal::ZERO);
        order.assigned_supervisor_id = Some(supervisor.to_string());
        order.status = OrderStatus::UnderReview;
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
    async fn test_owning_supervisor_assigns_delegate() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed_supervised_order(&storage, "ord-1", "sup-1");
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 2_000);

        let action = AssignDelegateAction {
            order_id: "ord-1".to_string(),
            delegate_id: "del-1".to_string(),
        };
        action
            .execute(&mut ctx, &metadata_for(Actor::supervisor("sup-1")))
            .await
            .unwrap();

        let order = ctx.load_order("ord-1").unwrap();
        assert_eq!(order.assigned_delegate_id.as_deref(), Some("del-1"));
        assert_eq!(order.status, OrderStatus::Assigned);
        assert_eq!(order.delegate_assigned_at, Some(2_000));
    }

    #[tokio::test]
    async fn test_requires_supervisor_first() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let order = OrderRecord::new("ord-1", "ORD2026010110001", "client-1", Decimal::ZERO);
        storage.store_order(&txn, &order).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = AssignDelegateAction {
            order_id: "ord-1".to_string(),
            delegate_id: "del-1".to_string(),
        };
        let err = action
            .execute(&mut ctx, &metadata_for(Actor::admin("root")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NoSupervisor(_)));
    }

    #[tokio::test]
    async fn test_foreign_supervisor_rejected() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed_supervised_order(&storage, "ord-1", "sup-1");
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = AssignDelegateAction {
            order_id: "ord-1".to_string(),
            delegate_id: "del-1".to_string(),
        };
        let err = action
            .execute(&mut ctx, &metadata_for(Actor::supervisor("sup-2")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotYourOrder(_)));
    }

    #[tokio::test]
    async fn test_delegate_slot_is_one_shot() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed_supervised_order(&storage, "ord-1", "sup-1");
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let meta = metadata_for(Actor::supervisor("sup-1"));

        let first = AssignDelegateAction {
            order_id: "ord-1".to_string(),
            delegate_id: "del-1".to_string(),
        };
        first.execute(&mut ctx, &meta).await.unwrap();

        // Replay of the same delegate is a no-op
        first.execute(&mut ctx, &meta).await.unwrap();

        let second = AssignDelegateAction {
            order_id: "ord-1".to_string(),
            delegate_id: "del-2".to_string(),
        };
        let err = second.execute(&mut ctx, &meta).await.unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyAssigned(_)));
    }
}
