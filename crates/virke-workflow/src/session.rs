//! Process-wide session holder.
//!
//! Workflow functions take the session as an explicit parameter; this
//! holder exists only at the application's entry boundary, where the
//! identity collaborator deposits the signed-in session and handlers
//! read it before calling into the workflows. Nothing below the entry
//! boundary reaches for ambient state.

use std::sync::Mutex;
use virke_commerce::{QuoteError, UserId};
use virke_store::Session;

use crate::error::WorkflowError;

/// Holds the current session for the running process.
#[derive(Default)]
pub struct SessionHolder {
    inner: Mutex<Option<Session>>,
}

impl SessionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session after sign-in.
    pub fn set(&self, session: Session) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(session);
        }
    }

    /// Drop the session after sign-out.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
    }

    /// The current session, if one is set and still valid.
    pub fn current(&self) -> Option<Session> {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
            .filter(|s| s.is_valid())
    }

    /// The signed-in user's ID, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.current().map(|s| s.user_id)
    }

    /// The current session, or an auth-required error.
    pub fn require(&self) -> Result<Session, WorkflowError> {
        self.current().ok_or(WorkflowError::Quote(QuoteError::AuthRequired))
    }
}
