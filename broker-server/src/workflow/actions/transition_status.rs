//! TransitionStatus command handler
//!
//! Direct status movement by staff, gated by the role transition
//! tables. Completion stamps the completing actor; a same-status
//! transition is accepted without touching the record.

use async_trait::async_trait;
use shared::workflow::OrderStatus;

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};
use crate::workflow::transitions::check_transition;

/// TransitionStatus action
#[derive(Debug, Clone)]
pub struct TransitionStatusAction {
    pub order_id: String,
    pub target: OrderStatus,
}

#[async_trait]
impl CommandHandler for TransitionStatusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        let mut order = ctx.load_order(&self.order_id)?;
        check_transition(&order, &metadata.actor, self.target)?;

        if order.status == self.target {
            return Ok(ActionOutcome::order(&self.order_id));
        }

        order.status = self.target;
        if self.target == OrderStatus::Completed {
            order.completed_by = Some(metadata.actor.id.clone());
            order.completed_at = Some(ctx.now);
        }
        // Reaching a terminal state closes out any outstanding
        // cancellation request
        if self.target.is_terminal() {
            order.cancellation = None;
        }

        ctx.save_order(order);
        Ok(ActionOutcome::order(&self.order_id))
    }
}
