//! AssignSupervisor command handler
//!
//! One-shot claim of an unclaimed order. A supervisor may only claim
//! for themselves; an admin may install any supervisor. The supervisor
//! slot never changes once set.

use async_trait::async_trait;
use shared::workflow::{OrderStatus, Role};

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// AssignSupervisor action
#[derive(Debug, Clone)]
pub struct AssignSupervisorAction {
    pub order_id: String,
    pub supervisor_id: String,
}

#[async_trait]
impl CommandHandler for AssignSupervisorAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        match metadata.actor.role {
            Role::Supervisor => {
                if metadata.actor.id != self.supervisor_id {
                    return Err(WorkflowError::Forbidden(
                        "supervisors may only claim orders for themselves".to_string(),
                    ));
                }
            }
            Role::Admin => {}
            _ => {
                return Err(WorkflowError::Forbidden(
                    "only supervisors and admins can assign a supervisor".to_string(),
                ));
            }
        }

        let mut order = ctx.load_order(&self.order_id)?;
        if order.is_closed() {
            return Err(WorkflowError::OrderClosed(self.order_id.clone()));
        }

        match order.assigned_supervisor_id.as_deref() {
            // Replaying the winning claim is a no-op
            Some(existing) if existing == self.supervisor_id => {
                return Ok(ActionOutcome::order(&self.order_id));
            }
            Some(_) => {
                return Err(WorkflowError::AlreadyAssigned(format!(
                    "order {} already has a supervisor",
                    self.order_id
                )));
            }
            None => {}
        }

        order.assigned_supervisor_id = Some(self.supervisor_id.clone());
        order.assigned_at = Some(ctx.now);
        if order.status == OrderStatus::New {
            order.status = OrderStatus::UnderReview;
        }

        ctx.save_order(order);
        Ok(ActionOutcome::order(&self.order_id))
    }
}
