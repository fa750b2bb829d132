//! Logging Standards and Conventions
//!
//! All crates log through `tracing`. The binary installs a subscriber once
//! with [`init_logging`]; libraries never install one.
//!
//! # Log Levels
//!
//! | Level | Usage | Examples |
//! |-------|-------|----------|
//! | ERROR | Unrecoverable errors, data corruption | Undecodable record, store open failure |
//! | WARN  | Recoverable issues | Transient storage fault retried, fail-soft read |
//! | INFO  | Significant state changes | Contribution recorded, campaign fulfilled, milestone reached |
//! | DEBUG | Detailed operation flow | Duplicate event rejected, filters applied |
//! | TRACE | Fine-grained debugging | Full records |
//!
//! # Structured Logging Fields
//!
//! Always use structured fields for key information (`campaign_id`,
//! `event_id`, `wallet`, `amount`, `attempt`, `error`):
//!
//! ```ignore
//! use tracing::info;
//!
//! info!(
//!     campaign_id = %campaign.id,
//!     event_id = %contribution.event_id,
//!     amount = %contribution.amount,
//!     "Contribution recorded"
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level enumeration matching tracing levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty-printed for development
    Pretty,
    /// JSON for production
    Json,
    /// Compact single-line
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Compact
    }
}

impl LogFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Environment filter string (e.g., "cf_db=debug,tower_http=warn").
    /// Overrides `level` when set.
    pub filter: Option<String>,
    /// Include source file/line
    pub include_source: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            filter: None,
            include_source: false,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - CF_LOG_LEVEL: error/warn/info/debug/trace
    /// - CF_LOG_FORMAT: pretty/json/compact
    /// - RUST_LOG: full filter directive, wins over CF_LOG_LEVEL
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: env::var("CF_LOG_LEVEL")
                .ok()
                .and_then(|s| LogLevel::from_str(&s))
                .unwrap_or(defaults.level),
            format: env::var("CF_LOG_FORMAT")
                .ok()
                .and_then(|s| LogFormat::from_str(&s))
                .unwrap_or(defaults.format),
            filter: env::var("RUST_LOG").ok().filter(|s| !s.trim().is_empty()),
            include_source: defaults.include_source,
        }
    }

    /// Filter directive applied when no explicit filter is configured
    pub fn default_directive(&self) -> String {
        format!(
            "cf_core={level},cf_db={level},cf_api={level},cf_cli={level},tower_http=info",
            level = self.level
        )
    }
}

/// Initialize the global subscriber
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match &config.filter {
        Some(f) => EnvFilter::try_new(f)?,
        None => EnvFilter::try_new(config.default_directive())?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(config.include_source)
                    .with_line_number(config.include_source),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(config.include_source)
                    .with_line_number(config.include_source),
            )
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_file(config.include_source)
                    .with_line_number(config.include_source),
            )
            .try_init()?,
    }

    Ok(())
}
