//! Client-side notification inbox.
//!
//! The realtime channel delivers at least once and only roughly in
//! creation order, so the inbox treats notification IDs as a set:
//! duplicates are dropped, and ordering is re-derived from creation
//! timestamps.

use std::collections::HashSet;
use virke_commerce::quote::Notification;
use virke_commerce::NotificationId;

/// Deduplicating, newest-first collection of one user's notifications.
#[derive(Default)]
pub struct NotificationInbox {
    seen: HashSet<NotificationId>,
    notifications: Vec<Notification>,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the inbox from a stored list (e.g., on page load).
    pub fn hydrate(&mut self, notifications: Vec<Notification>) {
        for n in notifications {
            self.ingest(n);
        }
    }

    /// Take in one notification, from any source. Returns false when
    /// the ID was already seen (duplicate realtime delivery).
    pub fn ingest(&mut self, notification: Notification) -> bool {
        if !self.seen.insert(notification.id.clone()) {
            return false;
        }
        let pos = self
            .notifications
            .partition_point(|n| n.created_at >= notification.created_at);
        self.notifications.insert(pos, notification);
        true
    }

    /// Mark one notification read. Returns false if it is not present.
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        match self.notifications.iter_mut().find(|n| &n.id == id) {
            Some(n) => {
                n.mark_read();
                true
            }
            None => false,
        }
    }

    /// Number of unread notifications (the bell badge).
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| n.is_unread()).count()
    }

    /// All notifications, newest first.
    pub fn items(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}
