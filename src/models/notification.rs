use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A per-user inbox record.
///
/// Notifications move through a two-state machine, `UNREAD → READ`, driven
/// by the ledger operations on [`crate::db::Database`]. The unread count is
/// always derived from the stored rows; there is no separate counter to
/// drift out of sync when records are marked or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    /// Recipient user. Opaque external id.
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// What produced a notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A task moved between lifecycle statuses.
    StatusChange,
    /// A task was assigned to the recipient.
    TaskAssigned,
    /// Someone commented on a task the recipient is assigned to.
    CommentAdded,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusChange => "STATUS_CHANGE",
            Self::TaskAssigned => "TASK_ASSIGNED",
            Self::CommentAdded => "COMMENT_ADDED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "STATUS_CHANGE" => Some(Self::StatusChange),
            "TASK_ASSIGNED" => Some(Self::TaskAssigned),
            "COMMENT_ADDED" => Some(Self::CommentAdded),
            _ => None,
        }
    }
}

/// Input for creating a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Unread-count response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: i64,
}
