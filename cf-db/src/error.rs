//! Storage error types
//!
//! Backend faults are classified here as transient or terminal before
//! they leave the crate as [`LedgerError`].

use cf_core::LedgerError;
use std::io;
use thiserror::Error;

/// Network/driver error codes treated as transient
const TRANSIENT_CODES: &[&str] = &[
    "ETIMEDOUT",
    "ECONNRESET",
    "EPIPE",
    "ENETUNREACH",
    "ECONNREFUSED",
];

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted record in {tree}: {reason}")]
    Corrupted { tree: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DbError {
    /// Whether retrying the same operation may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            DbError::Io(e) => is_transient_io(e),
            DbError::Sled(sled::Error::Io(e)) => is_transient_io(e),
            DbError::Sled(_) => false,
            DbError::Serialization(_) | DbError::Corrupted { .. } | DbError::Configuration(_) => {
                false
            }
        }
    }
}

fn is_transient_io(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    ) || is_transient_message(&e.to_string())
}

/// Message-based classification for drivers that only surface text
pub fn is_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_CODES
        .iter()
        .any(|code| lower.contains(&code.to_lowercase()))
        || lower.contains("timeout")
        || lower.contains("timed out")
        || (lower.contains("connection") && lower.contains("closed"))
}

impl From<DbError> for LedgerError {
    fn from(e: DbError) -> Self {
        if e.is_transient() {
            LedgerError::TransientStorage(e.to_string())
        } else {
            LedgerError::Fatal(e.to_string())
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
