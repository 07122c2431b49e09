//! User notifications.

use crate::ids::{NotificationId, QuoteId, UserId};
use serde::{Deserialize, Serialize};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// A customer submitted a new quote.
    QuoteSubmitted,
    /// A quote's status changed.
    QuoteStatusChanged,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::QuoteSubmitted => "quote_submitted",
            NotificationKind::QuoteStatusChanged => "quote_status_changed",
        }
    }
}

/// Read state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NotificationStatus {
    #[default]
    Unread,
    Read,
}

/// A notification delivered to one user.
///
/// Created by the submission workflow and the lifecycle manager;
/// independently read and dismissed by recipients. The realtime channel
/// may deliver a notification more than once; consumers must treat IDs
/// as a set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// What this notification is about.
    pub kind: NotificationKind,
    /// Human-readable message.
    pub message: String,
    /// The quote this notification refers to, if any.
    pub quote_id: Option<QuoteId>,
    /// Read state.
    pub status: NotificationStatus,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl Notification {
    /// Create a new unread notification.
    pub fn new(user_id: UserId, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::generate(),
            user_id,
            kind,
            message: message.into(),
            quote_id: None,
            status: NotificationStatus::Unread,
            created_at: current_timestamp(),
        }
    }

    /// Attach the related quote.
    pub fn about_quote(mut self, quote_id: QuoteId) -> Self {
        self.quote_id = Some(quote_id);
        self
    }

    /// Mark as read.
    pub fn mark_read(&mut self) {
        self.status = NotificationStatus::Read;
    }

    /// Whether the notification is unread.
    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
