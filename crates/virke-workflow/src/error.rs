//! Workflow error types.

use thiserror::Error;
use virke_commerce::QuoteError;
use virke_store::StoreError;

/// Errors surfaced by the workflow services.
///
/// Domain validation failures and collaborator failures stay
/// distinguishable so callers can tell "fix your input" apart from
/// "try again later".
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A domain rule was violated.
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// A collaborator call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// Whether the error is a validation failure (as opposed to a
    /// collaborator failure).
    pub fn is_validation(&self) -> bool {
        matches!(self, WorkflowError::Quote(_))
    }
}
