//! Session types returned by the identity collaborator.

use serde::{Deserialize, Serialize};
use virke_commerce::UserId;

/// An authenticated session.
///
/// Yields a stable user id and a validity signal; token refresh and
/// provider details live behind the identity collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// The signed-in user.
    pub user_id: UserId,
    /// Account email.
    pub email: String,
    /// Whether the user has staff/admin privileges.
    pub is_admin: bool,
    /// Unix timestamp after which the session is no longer valid.
    pub expires_at: i64,
}

impl Session {
    /// Check session validity against the current time.
    pub fn is_valid(&self) -> bool {
        current_timestamp() < self.expires_at
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
    fn test_session_validity() {
        let session = Session {
            user_id: UserId::new("u1"),
            email: "u1@example.com".to_string(),
            is_admin: false,
            expires_at: i64::MAX,
        };
        assert!(session.is_valid());

        let expired = Session {
            expires_at: 0,
            ..session
        };
        assert!(!expired.is_valid());
    }
}
