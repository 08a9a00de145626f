//! Order status enumeration
//!
//! One canonical English enumeration. The legacy system mixed English
//! enum-like values with literal Arabic phrases as if they were the
//! same status domain; here the Arabic phrases are accepted as a
//! legacy-input adapter and available as display strings, but the
//! canonical wire values are the snake_case English ones.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ErrorCode;

/// Order lifecycle status
///
/// ```text
/// new → under_review → assigned → in_progress
///          ⇅ waiting_attachments / waiting_client ⇅
///     in_progress → completed | cancelled   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrderStatus {
    /// Created by the client, not yet claimed
    #[default]
    New,
    /// Supervisor assigned, delegate pending
    UnderReview,
    /// Supervisor and delegate assigned
    Assigned,
    /// Active work
    InProgress,
    /// Suspended: attachments or extra data required
    WaitingAttachments,
    /// Suspended: waiting on a client data-request response
    WaitingClient,
    /// Terminal: finished successfully
    Completed,
    /// Terminal: cancelled
    Cancelled,
}

impl OrderStatus {
    /// Canonical wire value
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::UnderReview => "under_review",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::WaitingAttachments => "waiting_attachments",
            Self::WaitingClient => "waiting_client",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Arabic display phrase (the legacy system's literal values)
    pub const fn display_ar(&self) -> &'static str {
        match self {
            Self::New => "جديد",
            Self::UnderReview => "تعيين مشرف",
            Self::Assigned => "تعيين مندوب",
            Self::InProgress => "تحت الإجراء",
            Self::WaitingAttachments => "مطلوب بيانات إضافية أو مرفقات",
            Self::WaitingClient => "بانتظار رد العميل",
            Self::Completed => "تم الانتهاء بنجاح",
            Self::Cancelled => "ملغي",
        }
    }

    /// Terminal states accept no further transitions
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Waiting states suspend active work on the order
    pub const fn is_waiting(&self) -> bool {
        matches!(self, Self::WaitingAttachments | Self::WaitingClient)
    }

    /// Statuses from which a client may request cancellation
    pub const fn is_cancellable(&self) -> bool {
        !self.is_terminal()
    }

    /// All status values, in lifecycle order
    pub const ALL: [OrderStatus; 8] = [
        Self::New,
        Self::UnderReview,
        Self::Assigned,
        Self::InProgress,
        Self::WaitingAttachments,
        Self::WaitingClient,
        Self::Completed,
        Self::Cancelled,
    ];
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ErrorCode;

    /// Accepts both canonical values and the legacy Arabic phrases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.trim() {
            "new" | "جديد" => Self::New,
            "under_review" | "تعيين مشرف" => Self::UnderReview,
            "assigned" | "تعيين مندوب" => Self::Assigned,
            "in_progress" | "تحت الإجراء" => Self::InProgress,
            "waiting_attachments" | "مطلوب بيانات إضافية أو مرفقات" => {
                Self::WaitingAttachments
            }
            "waiting_client" | "بانتظار رد العميل" => Self::WaitingClient,
            "completed" | "تم الانتهاء بنجاح" => Self::Completed,
            "cancelled" | "ملغي" => Self::Cancelled,
            _ => return Err(ErrorCode::InvalidStatus),
        };
        Ok(status)
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = ErrorCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> String {
        status.as_str().to_string()
    }
}
