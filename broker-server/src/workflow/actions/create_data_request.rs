//! CreateDataRequest command handler
//!
//! The owning supervisor asks the client for extra data or attachments.
//! The order suspends into `waiting_client` until the request is
//! closed.

use async_trait::async_trait;
use shared::workflow::{DataRequest, OrderStatus, Role};
use validator::Validate;

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// CreateDataRequest action
#[derive(Debug, Clone, Validate)]
pub struct CreateDataRequestAction {
    pub order_id: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

#[async_trait]
impl CommandHandler for CreateDataRequestAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        self.validate()
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;

        if !matches!(metadata.actor.role, Role::Supervisor | Role::Admin) {
            return Err(WorkflowError::Forbidden(
                "only supervisors and admins can request data".to_string(),
            ));
        }

        let mut order = ctx.load_order(&self.order_id)?;
        if order.is_closed() {
            return Err(WorkflowError::OrderClosed(self.order_id.clone()));
        }
        if metadata.actor.role == Role::Supervisor
            && order.assigned_supervisor_id.as_deref() != Some(metadata.actor.id.as_str())
        {
            return Err(WorkflowError::NotAssignedToYou(self.order_id.clone()));
        }

        let supervisor_id = order
            .assigned_supervisor_id
            .clone()
            .unwrap_or_else(|| metadata.actor.id.clone());

        let mut request = DataRequest::new(
            uuid::Uuid::new_v4().to_string(),
            &self.order_id,
            supervisor_id,
            &order.client_id,
            &self.message,
        );
        request.created_at = ctx.now;

        order.status = OrderStatus::WaitingClient;
        ctx.save_order(order);
        ctx.save_data_request(request.clone());

        tracing::info!(
            order_id = %self.order_id,
            request_id = %request.request_id,
            "Data request opened"
        );
        Ok(ActionOutcome::order(&self.order_id))
    }
}
