//! Storage and collaborator error types.

use thiserror::Error;

/// Errors that can occur talking to external collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Row not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend storage error (network/service failure).
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid credentials on sign-in.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No active session.
    #[error("No active session")]
    NoSession,

    /// Realtime channel is closed.
    #[error("Realtime channel closed")]
    ChannelClosed,
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::SerializationError(e.to_string())
    }
}
