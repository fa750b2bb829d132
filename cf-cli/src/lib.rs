//! CF CLI - Command Line Interface
//!
//! `cf start` runs the HTTP API over the configured ledger store. Every
//! other command is a thin client of a running server.
//!
//! # Usage
//!
//! ```text
//! cf [OPTIONS] <COMMAND>
//!
//! Commands:
//!   start         Start the API server
//!   status        Check health of a running server
//!   campaign      Campaign management
//!   contribution  Record and list contributions
//!   user          Wallet users
//!   achievements  Fulfilled campaigns of a creator
//!
//! Options:
//!   -a, --api-url <URL>    API endpoint URL [env: CF_API_URL] [default: http://localhost:3000]
//!   -f, --format <FORMAT>  Output format (json, table) [default: table]
//!   -v, --verbose          Enable verbose output
//! ```
//!
//! # Examples
//!
//! ```text
//! cf start --backend sled --data-dir ./data/ledger
//! cf campaign create --creator 0xa11ce -t Garden -d "Raised beds" -g 500 -e a@example.com -m Seeds=300
//! cf contribution record -c <campaign-id> -d 0xb0b -a 600 -t 0xabc
//! ```

pub mod client;
pub mod commands;
pub mod error;
pub mod handler;
pub mod output;

pub use client::CfClient;
pub use commands::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
