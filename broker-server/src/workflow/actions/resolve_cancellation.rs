//! ResolveCancellation command handler
//!
//! The owning supervisor (or an admin) approves or rejects the pending
//! cancellation request. Approval cancels the order terminally;
//! rejection requires a reason and restores the status snapshot taken
//! at request time.

use async_trait::async_trait;
use shared::workflow::{CancellationDecision, CancellationOutcome, OrderStatus, Role};

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// ResolveCancellation action
#[derive(Debug, Clone)]
pub struct ResolveCancellationAction {
    pub order_id: String,
    pub approve: bool,
    pub rejection_reason: Option<String>,
}

#[async_trait]
impl CommandHandler for ResolveCancellationAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        let mut order = ctx.load_order(&self.order_id)?;
        if order.is_closed() {
            return Err(WorkflowError::OrderClosed(self.order_id.clone()));
        }

        let authorized = match metadata.actor.role {
            Role::Admin => true,
            Role::Supervisor => {
                if order.assigned_supervisor_id.as_deref() != Some(metadata.actor.id.as_str()) {
                    return Err(WorkflowError::NotAssignedToYou(self.order_id.clone()));
                }
                true
            }
            _ => false,
        };
        if !authorized {
            return Err(WorkflowError::Forbidden(
                "only the owning supervisor or an admin can resolve a cancellation".to_string(),
            ));
        }

        let Some(pending) = order.cancellation.take() else {
            return Err(WorkflowError::NoPendingCancellation(self.order_id.clone()));
        };

        if self.approve {
            order.status = OrderStatus::Cancelled;
            order.cancellation_decision = Some(CancellationDecision {
                outcome: CancellationOutcome::Approved,
                decided_by: metadata.actor.id.clone(),
                decided_at: ctx.now,
                rejection_reason: None,
            });
        } else {
            let Some(reason) = self.rejection_reason.clone().filter(|r| !r.trim().is_empty())
            else {
                // Put the request back; the command failed
                order.cancellation = Some(pending);
                return Err(WorkflowError::Validation(
                    "rejection requires a reason".to_string(),
                ));
            };
            order.status = pending.previous_status;
            order.cancellation_decision = Some(CancellationDecision {
                outcome: CancellationOutcome::Rejected,
                decided_by: metadata.actor.id.clone(),
                decided_at: ctx.now,
                rejection_reason: Some(reason),
            });
        }

        ctx.save_order(order);
        Ok(ActionOutcome::order(&self.order_id))
    }
}
