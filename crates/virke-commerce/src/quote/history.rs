//! Quote audit history.

use crate::ids::{QuoteId, UserId};
use crate::quote::QuoteStatus;
use serde::{Deserialize, Serialize};

/// An append-only audit record for a quote.
///
/// One entry is appended on quote creation and on every status change.
/// Entries are never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteHistoryEntry {
    /// The quote this entry belongs to.
    pub quote_id: QuoteId,
    /// The status recorded by this entry.
    pub status: QuoteStatus,
    /// Free-text notes (e.g., "discount 250.00 kr applied").
    pub notes: Option<String>,
    /// Who caused the entry; None for customer-initiated creation.
    pub created_by: Option<UserId>,
    /// Unix timestamp of the entry.
    pub created_at: i64,
}

impl QuoteHistoryEntry {
    /// Create a new history entry.
    pub fn new(quote_id: QuoteId, status: QuoteStatus) -> Self {
        Self {
            quote_id,
            status,
            notes: None,
            created_by: None,
            created_at: current_timestamp(),
        }
    }

    /// Attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Record who caused the entry.
    pub fn by(mut self, user_id: UserId) -> Self {
        self.created_by = Some(user_id);
        self
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry() {
        let entry = QuoteHistoryEntry::new(QuoteId::new("q1"), QuoteStatus::Pending)
            .with_notes("created from cart")
            .by(UserId::new("admin-1"));

        assert_eq!(entry.status, QuoteStatus::Pending);
        assert_eq!(entry.notes.as_deref(), Some("created from cart"));
        assert_eq!(entry.created_by.as_ref().map(|u| u.as_str()), Some("admin-1"));
    }
}
