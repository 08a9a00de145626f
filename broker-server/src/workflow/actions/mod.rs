//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::workflow::traits::{ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError};
use shared::workflow::{WorkflowCommand, WorkflowCommandPayload};

mod assign_delegate;
mod assign_supervisor;
mod close_data_request;
mod create_data_request;
pub mod create_order;
mod mark_notification_read;
mod notify_completion;
mod request_cancellation;
mod resolve_cancellation;
mod respond_data_request;
mod transition_status;

pub use assign_delegate::AssignDelegateAction;
pub use assign_supervisor::AssignSupervisorAction;
pub use close_data_request::CloseDataRequestAction;
pub use create_data_request::CreateDataRequestAction;
pub use create_order::CreateOrderAction;
pub use mark_notification_read::MarkNotificationReadAction;
pub use notify_completion::NotifyCompletionAction;
pub use request_cancellation::RequestCancellationAction;
pub use resolve_cancellation::ResolveCancellationAction;
pub use respond_data_request::RespondDataRequestAction;
pub use transition_status::TransitionStatusAction;

/// WorkflowAction enum - dispatches to concrete action implementations
pub enum WorkflowAction {
    CreateOrder(CreateOrderAction),
    AssignSupervisor(AssignSupervisorAction),
    AssignDelegate(AssignDelegateAction),
    TransitionStatus(TransitionStatusAction),
    CreateDataRequest(CreateDataRequestAction),
    RespondDataRequest(RespondDataRequestAction),
    CloseDataRequest(CloseDataRequestAction),
    RequestCancellation(RequestCancellationAction),
    ResolveCancellation(ResolveCancellationAction),
    NotifyCompletion(NotifyCompletionAction),
    MarkNotificationRead(MarkNotificationReadAction),
}

#[async_trait]
impl CommandHandler for WorkflowAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        match self {
            WorkflowAction::CreateOrder(action) => action.execute(ctx, metadata).await,
            WorkflowAction::AssignSupervisor(action) => action.execute(ctx, metadata).await,
            WorkflowAction::AssignDelegate(action) => action.execute(ctx, metadata).await,
            WorkflowAction::TransitionStatus(action) => action.execute(ctx, metadata).await,
            WorkflowAction::CreateDataRequest(action) => action.execute(ctx, metadata).await,
            WorkflowAction::RespondDataRequest(action) => action.execute(ctx, metadata).await,
            WorkflowAction::CloseDataRequest(action) => action.execute(ctx, metadata).await,
            WorkflowAction::RequestCancellation(action) => action.execute(ctx, metadata).await,
            WorkflowAction::ResolveCancellation(action) => action.execute(ctx, metadata).await,
            WorkflowAction::NotifyCompletion(action) => action.execute(ctx, metadata).await,
            WorkflowAction::MarkNotificationRead(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert WorkflowCommand to WorkflowAction
///
/// This is the ONLY place with a match on WorkflowCommandPayload.
impl From<&WorkflowCommand> for WorkflowAction {
    fn from(cmd: &WorkflowCommand) -> Self {
        match &cmd.payload {
            WorkflowCommandPayload::CreateOrder { .. } => {
                // CreateOrder is handled in WorkflowManager to pre-generate
                // order id and reference before the write transaction
                unreachable!("CreateOrder should be handled by WorkflowManager, not From<&WorkflowCommand>")
            }
            WorkflowCommandPayload::AssignSupervisor {
                order_id,
                supervisor_id,
            } => WorkflowAction::AssignSupervisor(AssignSupervisorAction {
                order_id: order_id.clone(),
                supervisor_id: supervisor_id.clone(),
            }),
            WorkflowCommandPayload::AssignDelegate {
                order_id,
                delegate_id,
            } => WorkflowAction::AssignDelegate(AssignDelegateAction {
                order_id: order_id.clone(),
                delegate_id: delegate_id.clone(),
            }),
            WorkflowCommandPayload::TransitionStatus { order_id, target } => {
                WorkflowAction::TransitionStatus(TransitionStatusAction {
                    order_id: order_id.clone(),
                    target: *target,
                })
            }
            WorkflowCommandPayload::CreateDataRequest { order_id, message } => {
                WorkflowAction::CreateDataRequest(CreateDataRequestAction {
                    order_id: order_id.clone(),
                    message: message.clone(),
                })
            }
            WorkflowCommandPayload::RespondDataRequest {
                request_id,
                client_note,
                uploaded_files,
            } => WorkflowAction::RespondDataRequest(RespondDataRequestAction {
                request_id: request_id.clone(),
                client_note: client_note.clone(),
                uploaded_files: uploaded_files.clone(),
            }),
            WorkflowCommandPayload::CloseDataRequest {
                request_id,
                supervisor_reply,
            } => WorkflowAction::CloseDataRequest(CloseDataRequestAction {
                request_id: request_id.clone(),
                supervisor_reply: supervisor_reply.clone(),
            }),
            WorkflowCommandPayload::RequestCancellation { order_id, reason } => {
                WorkflowAction::RequestCancellation(RequestCancellationAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            WorkflowCommandPayload::ResolveCancellation {
                order_id,
                approve,
                rejection_reason,
            } => WorkflowAction::ResolveCancellation(ResolveCancellationAction {
                order_id: order_id.clone(),
                approve: *approve,
                rejection_reason: rejection_reason.clone(),
            }),
            WorkflowCommandPayload::NotifyCompletion { order_id, message } => {
                WorkflowAction::NotifyCompletion(NotifyCompletionAction {
                    order_id: order_id.clone(),
                    message: message.clone(),
                })
            }
            WorkflowCommandPayload::MarkNotificationRead { notification_id } => {
                WorkflowAction::MarkNotificationRead(MarkNotificationReadAction {
                    notification_id: notification_id.clone(),
                })
            }
        }
    }
}
