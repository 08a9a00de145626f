//! CloseDataRequest command handler
//!
//! The owning supervisor (or an admin) closes a data request. If the
//! order was suspended waiting on the client, closing the request
//! resumes active work.

use async_trait::async_trait;
use shared::workflow::{DataRequestStatus, OrderStatus, Role};

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// CloseDataRequest action
#[derive(Debug, Clone)]
pub struct CloseDataRequestAction {
    pub request_id: String,
    pub supervisor_reply: Option<String>,
}

#[async_trait]
impl CommandHandler for CloseDataRequestAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        let mut request = ctx.load_data_request(&self.request_id)?;

        let authorized = metadata.actor.role == Role::Admin
            || (metadata.actor.role == Role::Supervisor
                && metadata.actor.id == request.supervisor_id);
        if !authorized {
            return Err(WorkflowError::Forbidden(
                "only the requesting supervisor or an admin can close a data request".to_string(),
            ));
        }
        if request.is_closed() {
            return Err(WorkflowError::RequestClosed(self.request_id.clone()));
        }

        request.supervisor_reply = self.supervisor_reply.clone();
        request.status = DataRequestStatus::Closed;
        request.closed_at = Some(ctx.now);

        let order_id = request.order_id.clone();
        ctx.save_data_request(request);

        // Resume the order only once nothing else is waiting on the
        // client
        let mut order = ctx.load_order(&order_id)?;
        if order.status == OrderStatus::WaitingClient
            && ctx
                .load_requests_for_order(&order_id)?
                .iter()
                .all(|r| r.is_closed())
        {
            order.status = OrderStatus::InProgress;
            ctx.save_order(order);
        }

        Ok(ActionOutcome::order(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::storage::WorkflowStorage;
    use crate::workflow::traits::CommandContext;
    use rust_decimal::Decimal;
    use shared::workflow::{Actor, DataRequest, OrderRecord};

    fn seed(storage: &WorkflowStorage, order_status: OrderStatus, request_status: DataRequestStatus) {
        let txn = storage.begin_write().unwrap();
        let mut order = OrderRecord::new("ord-1", "ORD2026010110001", "client-1", Decimal::ZERO);
        order.assigned_supervisor_id = Some("sup-1".into());
        order.status = order_status;
        storage.store_order(&txn, &order).unwrap();

        let mut request = DataRequest::new("req-1", "ord-1", "sup-1", "client-1", "passport copy");
        request.status = request_status;
        storage.store_data_request(&txn, &request).unwrap();
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
    async fn test_close_resumes_suspended_order() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::WaitingClient, DataRequestStatus::Responded);
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 5_000);

        let action = CloseDataRequestAction {
            request_id: "req-1".to_string(),
            supervisor_reply: Some("received, thanks".to_string()),
        };
        action
            .execute(&mut ctx, &metadata_for(Actor::supervisor("sup-1")))
            .await
            .unwrap();

        let request = ctx.load_data_request("req-1").unwrap();
        assert_eq!(request.status, DataRequestStatus::Closed);
        assert_eq!(request.closed_at, Some(5_000));
        assert_eq!(request.supervisor_reply.as_deref(), Some("received, thanks"));

        assert_eq!(ctx.load_order("ord-1").unwrap().status, OrderStatus::InProgress);
    }

    #[tokio::test]
    async fn test_close_leaves_other_statuses_alone() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::WaitingAttachments, DataRequestStatus::Pending);
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = CloseDataRequestAction {
            request_id: "req-1".to_string(),
            supervisor_reply: None,
        };
        action
            .execute(&mut ctx, &metadata_for(Actor::admin("root")))
            .await
            .unwrap();

        assert_eq!(
            ctx.load_order("ord-1").unwrap().status,
            OrderStatus::WaitingAttachments
        );
    }

    #[tokio::test]
    async fn test_order_stays_suspended_while_another_request_open() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::WaitingClient, DataRequestStatus::Responded);
        let txn = storage.begin_write().unwrap();
        let mut newer = DataRequest::new("req-2", "ord-1", "sup-1", "client-1", "utility bill");
        newer.created_at = chrono::Utc::now().timestamp_millis() + 1;
        storage.store_data_request(&txn, &newer).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let meta = metadata_for(Actor::supervisor("sup-1"));

        // Closing the older request leaves the newer one pending
        let close_older = CloseDataRequestAction {
            request_id: "req-1".to_string(),
            supervisor_reply: None,
        };
        close_older.execute(&mut ctx, &meta).await.unwrap();
        assert_eq!(
            ctx.load_order("ord-1").unwrap().status,
            OrderStatus::WaitingClient
        );

        // Closing the last open request resumes the order
        let close_newer = CloseDataRequestAction {
            request_id: "req-2".to_string(),
            supervisor_reply: None,
        };
        close_newer.execute(&mut ctx, &meta).await.unwrap();
        assert_eq!(
            ctx.load_order("ord-1").unwrap().status,
            OrderStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_foreign_supervisor_rejected() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::WaitingClient, DataRequestStatus::Responded);
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = CloseDataRequestAction {
            request_id: "req-1".to_string(),
            supervisor_reply: None,
        };
        let err = action
            .execute(&mut ctx, &metadata_for(Actor::supervisor("sup-2")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_double_close_rejected() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        seed(&storage, OrderStatus::InProgress, DataRequestStatus::Closed);
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = CloseDataRequestAction {
            request_id: "req-1".to_string(),
            supervisor_reply: None,
        };
        let err = action
            .execute(&mut ctx, &metadata_for(Actor::supervisor("sup-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::RequestClosed(_)));
    }
}
