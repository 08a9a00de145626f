//! NotifyCompletion command handler
//!
//! The assigned delegate reports field completion to the owning
//! supervisor. The order itself does not move; the supervisor decides
//! when to complete it. Repeated notices are allowed and each produces
//! its own notification.

use async_trait::async_trait;
use shared::workflow::{Notification, NotificationKind, Role};

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// NotifyCompletion action
#[derive(Debug, Clone)]
pub struct NotifyCompletionAction {
    pub order_id: String,
    pub message: Option<String>,
}

#[async_trait]
impl CommandHandler for NotifyCompletionAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        if metadata.actor.role != Role::Delegate {
            return Err(WorkflowError::Forbidden(
                "only delegates can report completion".to_string(),
            ));
        }

        let order = ctx.load_order(&self.order_id)?;
        // Absent and foreign delegates fail the same way; either way
        // this actor is not the order's delegate
        if order.assigned_delegate_id.as_deref() != Some(metadata.actor.id.as_str()) {
            return Err(WorkflowError::NotAssigned(self.order_id.clone()));
        }
        if order.assigned_supervisor_id.is_none() {
            return Err(WorkflowError::NoSupervisor(self.order_id.clone()));
        }

        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("Delegate reported completion of order {}", order.reference));

        ctx.emit_alert(
            Notification::new(
                &self.order_id,
                NotificationKind::Completion,
                order.assigned_supervisor_id.clone(),
                message,
            )
            .with_delegate(&metadata.actor.id),
        );

        Ok(ActionOutcome::order(&self.order_id))
    }
}
