//! Staff notification records
//!
//! Notifications relay workflow events to staff. Each notification has
//! exactly one recipient slot: the owning supervisor when one exists,
//! otherwise the admin pool. Delivery is best-effort; the durable row
//! is the source of truth and carries an unread/read flag.

use serde::{Deserialize, Serialize};

/// Recipient key for notifications addressed to the admin pool rather
/// than a specific supervisor
pub const ADMIN_RECIPIENT: &str = "admin";

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Delegate reports field work done
    Completion,
    /// Client asked to cancel the order
    CancellationRequested,
    /// A new unclaimed order exists
    OrderCreated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Unread,
    Read,
}

/// A persisted staff notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Opaque unique id (uuid)
    pub notification_id: String,
    /// Order the notification concerns
    pub order_id: String,
    pub kind: NotificationKind,
    /// Delegate who triggered it, for completion notices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate_id: Option<String>,
    /// Addressed supervisor; `None` routes to the admin pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_id: Option<String>,
    pub message: String,
    pub status: NotificationStatus,
    /// Unix millis
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<i64>,
}

impl Notification {
    pub fn new(
        order_id: impl Into<String>,
        kind: NotificationKind,
        supervisor_id: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            notification_id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.into(),
            kind,
            delegate_id: None,
            supervisor_id,
            message: message.into(),
            status: NotificationStatus::Unread,
            created_at: chrono::Utc::now().timestamp_millis(),
            read_at: None,
        }
    }

    pub fn with_delegate(mut self, delegate_id: impl Into<String>) -> Self {
        self.delegate_id = Some(delegate_id.into());
        self
    }

    /// Key the notification is indexed under for recipient lookups
    pub fn recipient_key(&self) -> &str {
        self.supervisor_id.as_deref().unwrap_or(ADMIN_RECIPIENT)
    }

    pub fn is_read(&self) -> bool {
        self.status == NotificationStatus::Read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_unread() {
        let note = Notification::new(
            "ord-1",
            NotificationKind::Completion,
            Some("sup-1".into()),
            "field work finished",
        )
        .with_delegate("del-1");

        assert_eq!(note.status, NotificationStatus::Unread);
        assert!(!note.is_read());
        assert_eq!(note.recipient_key(), "sup-1");
        assert_eq!(note.delegate_id.as_deref(), Some("del-1"));
    }

    #[test]
    fn test_admin_recipient_fallback() {
        let note = Notification::new(
            "ord-2",
            NotificationKind::OrderCreated,
            None,
            "new order awaiting review",
        );
        assert_eq!(note.recipient_key(), ADMIN_RECIPIENT);
    }

    #[test]
    fn test_serde_roundtrip() {
        let note = Notification::new(
            "ord-3",
            NotificationKind::CancellationRequested,
            Some("sup-2".into()),
            "client requested cancellation",
        );
        let json = serde_json::to_string(&note).unwrap();
        let back: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, note);
    }
}
