//! MarkNotificationRead command handler
//!
//! The addressed recipient acknowledges a notification. Supervisors may
//! only acknowledge their own; admins may acknowledge anything,
//! including admin-pool notices. Acknowledging twice is a no-op.

use async_trait::async_trait;
use shared::workflow::{NotificationStatus, Role};

use crate::workflow::traits::{
    ActionOutcome, CommandContext, CommandHandler, CommandMetadata, WorkflowError,
};

/// MarkNotificationRead action
#[derive(Debug, Clone)]
pub struct MarkNotificationReadAction {
    pub notification_id: String,
}

#[async_trait]
impl CommandHandler for MarkNotificationReadAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<ActionOutcome, WorkflowError> {
        let mut notification = ctx.load_notification(&self.notification_id)?;

        let authorized = match metadata.actor.role {
            Role::Admin => true,
            Role::Supervisor => {
                notification.supervisor_id.as_deref() == Some(metadata.actor.id.as_str())
            }
            _ => false,
        };
        if !authorized {
            return Err(WorkflowError::Forbidden(
                "notification is addressed to another recipient".to_string(),
            ));
        }

        let order_id = notification.order_id.clone();
        if notification.is_read() {
            return Ok(ActionOutcome::order(order_id));
        }

        notification.status = NotificationStatus::Read;
        notification.read_at = Some(ctx.now);
        ctx.save_notification(notification);

        Ok(ActionOutcome::order(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::storage::WorkflowStorage;
    use crate::workflow::traits::CommandContext;
    use shared::workflow::{Actor, Notification, NotificationKind};

    fn seed_notification(storage: &WorkflowStorage, supervisor: Option<&str>) -> String {
        let txn = storage.begin_write().unwrap();
        let note = Notification::new(
            "ord-1",
            NotificationKind::Completion,
            supervisor.map(str::to_string),
            "done",
        );
        let id = note.notification_id.clone();
        storage.store_notification(&txn, &note).unwrap();
        txn.commit().unwrap();
        id
    }

    fn metadata_for(actor: Actor) -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            actor,
            timestamp: 1234567890,
        }
    }

    #[tokio::test]
    async fn test_addressed_supervisor_marks_read() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        let id = seed_notification(&storage, Some("sup-1"));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 8_000);

        let action = MarkNotificationReadAction {
            notification_id: id.clone(),
        };
        action
            .execute(&mut ctx, &metadata_for(Actor::supervisor("sup-1")))
            .await
            .unwrap();

        let note = ctx.load_notification(&id).unwrap();
        assert!(note.is_read());
        assert_eq!(note.read_at, Some(8_000));
    }

    #[tokio::test]
    async fn test_double_acknowledge_is_noop() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        let id = seed_notification(&storage, Some("sup-1"));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 8_000);

        let meta = metadata_for(Actor::supervisor("sup-1"));
        let action = MarkNotificationReadAction {
            notification_id: id.clone(),
        };
        action.execute(&mut ctx, &meta).await.unwrap();

        let mut later = CommandContext::new(&txn, &storage, 9_000);
        later.save_notification(ctx.load_notification(&id).unwrap());
        action.execute(&mut later, &meta).await.unwrap();
        assert_eq!(later.load_notification(&id).unwrap().read_at, Some(8_000));
    }

    #[tokio::test]
    async fn test_foreign_supervisor_rejected() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        let id = seed_notification(&storage, Some("sup-1"));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = MarkNotificationReadAction {
            notification_id: id,
        };
        let err = action
            .execute(&mut ctx, &metadata_for(Actor::supervisor("sup-2")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_pool_notice_requires_admin() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        let id = seed_notification(&storage, None);
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = MarkNotificationReadAction {
            notification_id: id.clone(),
        };
        let err = action
            .execute(&mut ctx, &metadata_for(Actor::supervisor("sup-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        action
            .execute(&mut ctx, &metadata_for(Actor::admin("root")))
            .await
            .unwrap();
        assert!(ctx.load_notification(&id).unwrap().is_read());
    }

    #[tokio::test]
    async fn test_missing_notification() {
        let storage = WorkflowStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let action = MarkNotificationReadAction {
            notification_id: "missing".to_string(),
        };
        let err = action
            .execute(&mut ctx, &metadata_for(Actor::admin("root")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotificationNotFound(_)));
    }
}
