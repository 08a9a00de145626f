//! RespondDataRequest command handler
//!
//! The client answers an open data request with a note and/or uploaded
//! file references. The order stays suspended until the supervisor
//! closes the request.

use async_trait::async_trait;
use shared::workflow::{DataRequestStatus, FileRef};

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// RespondDataRequest action
#[derive(Debug, Clone)]
pub struct RespondDataRequestAction {
    pub request_id: String,
    pub client_note: Option<String>,
    pub uploaded_files: Vec<FileRef>,
}

#[async_trait]
impl CommandHandler for RespondDataRequestAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        let mut request = ctx.load_data_request(&self.request_id)?;

        if metadata.actor.id != request.client_id {
            return Err(WorkflowError::Forbidden(
                "only the requested client can respond".to_string(),
            ));
        }
        if request.is_closed() {
            return Err(WorkflowError::RequestClosed(self.request_id.clone()));
        }

        if self.client_note.is_none() && self.uploaded_files.is_empty() {
            return Err(WorkflowError::Validation(
                "response must carry a note or at least one file".to_string(),
            ));
        }

        request.client_note = self.client_note.clone();
        request.uploaded_files.extend(self.uploaded_files.clone());
        request.status = DataRequestStatus::Responded;
        request.responded_at = Some(ctx.now);

        let order_id = request.order_id.clone();
        ctx.save_data_request(request);
        Ok(ActionOutcome::order(order_id))
    }
}
