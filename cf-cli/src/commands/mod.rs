//! CLI Commands Module
//!
//! Command definitions for the `cf` binary.

pub mod campaign;
pub mod contribution;
pub mod user;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Crowdfunding ledger CLI
#[derive(Parser, Debug)]
#[command(name = "cf")]
#[command(version)]
#[command(about = "Crowdfunding Ledger Command Line Interface")]
#[command(long_about = "A command-line tool for running and talking to the crowdfunding ledger.\n\n\
    `cf start` serves the HTTP API; the other commands are clients of a running server.")]
pub struct Cli {
    /// API endpoint URL
    #[arg(short, long, env = "CF_API_URL", default_value = "http://localhost:3000")]
    pub api_url: String,

    /// Output format (json, table)
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable
    #[default]
    Table,
}

/// Server settings for `cf start`
#[derive(clap::Args, Debug, Clone)]
pub struct StartArgs {
    /// Host to bind to
    #[arg(short = 'H', long, env = "CF_API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "CF_API_PORT", default_value = "3000")]
    pub port: u16,

    /// Store backend (memory, sled)
    #[arg(long, env = "CF_STORE_BACKEND", default_value = "sled")]
    pub backend: String,

    /// Sled data directory
    #[arg(long, env = "CF_DATA_DIR", default_value = "./data/ledger")]
    pub data_dir: PathBuf,

    /// Flush the store when the server stops
    #[arg(long, env = "CF_FLUSH_ON_SHUTDOWN", default_value_t = true, action = ArgAction::Set)]
    pub flush_on_shutdown: bool,

    /// Allow cross-origin requests
    #[arg(long, env = "CF_API_CORS", default_value_t = true, action = ArgAction::Set)]
    pub cors: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Start(StartArgs),

    /// Check health of a running server
    Status,

    /// Campaign management
    #[command(subcommand)]
    Campaign(campaign::CampaignCommands),

    /// Record and list contributions
    #[command(subcommand)]
    Contribution(contribution::ContributionCommands),

    /// Wallet users
    #[command(subcommand)]
    User(user::UserCommands),

    /// Fulfilled campaigns of a creator
    Achievements {
        /// Creator wallet address
        #[arg(short, long)]
        wallet: String,
    },
}

impl Commands {
    /// Commands that run the server rather than call it
    pub fn is_server(&self) -> bool {
        matches!(self, Commands::Start(_))
    }
}
