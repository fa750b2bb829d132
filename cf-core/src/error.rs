//! Error types for the funding ledger
//!
//! `Validation`, `DuplicateEvent`, `NotFound`, `Forbidden` and `Conflict`
//! are expected outcomes reported back to the caller as-is.
//! `TransientStorage` is the only retryable class. `Fatal` always propagates.

use thiserror::Error;

/// Ledger operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Missing or malformed input; storage was not touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// The external event identifier has already been recorded
    #[error("Event already recorded: {0}")]
    DuplicateEvent(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    /// Requester is not allowed to mutate the object
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request conflicts with the object's current lifecycle state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Retryable infrastructure fault (connection reset, timeout, ...)
    #[error("Transient storage error: {0}")]
    TransientStorage(String),

    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl LedgerError {
    /// Whether the retry wrapper may attempt the operation again
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::TransientStorage(_))
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::DuplicateEvent(_) => "DUPLICATE_EVENT",
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::Forbidden(_) => "FORBIDDEN",
            LedgerError::Conflict(_) => "CONFLICT",
            LedgerError::TransientStorage(_) => "TRANSIENT_STORAGE",
            LedgerError::Fatal(_) => "FATAL",
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Fatal(format!("Serialization error: {}", e))
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
