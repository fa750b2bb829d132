//! CF CLI Entry Point
//!
//! Configuration is loaded from environment variables (via .env file).
//! Command-line arguments override environment variables.

use cf_cli::{handler, Cli};
use cf_core::logging::{init_logging, LogConfig, LogLevel};
use clap::Parser;

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.verbose || cli.command.is_server() {
        let mut config = LogConfig::from_env();
        if cli.verbose {
            config.level = LogLevel::Debug;
        }
        if let Err(e) = init_logging(&config) {
            eprintln!("Failed to initialize logging: {}", e);
        }
    }

    if let Err(e) = handler::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
