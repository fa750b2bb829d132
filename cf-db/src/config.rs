//! Store and retry configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::DbError;
use crate::retry::{RetryPolicy, TransientFailurePolicy};

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local tables, lost on exit
    Memory,
    /// Embedded sled database under `data_dir`
    Sled,
}

impl FromStr for StoreBackend {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "sled" | "disk" => Ok(Self::Sled),
            other => Err(DbError::Configuration(format!(
                "unknown store backend: {}",
                other
            ))),
        }
    }
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sled => "sled",
        }
    }
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::Sled
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory holding the sled database
    pub data_dir: PathBuf,
    /// Flush dirty pages before the process exits
    pub flush_on_shutdown: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sled,
            data_dir: PathBuf::from("./data/ledger"),
            flush_on_shutdown: true,
        }
    }
}

impl StoreConfig {
    /// In-memory store, used by tests and `--backend memory`
    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            ..Default::default()
        }
    }

    pub fn sled(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: StoreBackend::Sled,
            data_dir: data_dir.into(),
            flush_on_shutdown: true,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - CF_STORE_BACKEND: memory/sled
    /// - CF_DATA_DIR: sled directory
    /// - CF_FLUSH_ON_SHUTDOWN: true/false
    pub fn from_env() -> Result<Self, DbError> {
        let defaults = Self::default();
        let backend = match env::var("CF_STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.backend,
        };

        Ok(Self {
            backend,
            data_dir: env::var("CF_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            flush_on_shutdown: env::var("CF_FLUSH_ON_SHUTDOWN")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(defaults.flush_on_shutdown),
        })
    }
}

/// Retry configuration for store operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// Outcome of a read whose every attempt failed transiently
    pub on_transient_failure: TransientFailurePolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            on_transient_failure: TransientFailurePolicy::EmptyResult,
        }
    }
}

impl RetryConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - CF_RETRY_ATTEMPTS
    /// - CF_RETRY_BASE_DELAY_MS
    /// - CF_READ_ON_TRANSIENT_FAILURE: empty_result/propagate
    pub fn from_env() -> Result<Self, DbError> {
        let defaults = Self::default();
        let on_transient_failure = match env::var("CF_READ_ON_TRANSIENT_FAILURE") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.on_transient_failure,
        };

        Ok(Self {
            max_attempts: env::var("CF_RETRY_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or(defaults.max_attempts),
            base_delay_ms: env::var("CF_RETRY_BASE_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.base_delay_ms),
            on_transient_failure,
        })
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            on_transient_failure: self.on_transient_failure,
        }
    }
}
