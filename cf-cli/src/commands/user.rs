//! User Commands

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Connect a wallet, creating the user if needed
    Connect {
        #[arg(short, long)]
        wallet: String,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Show a user profile
    Profile {
        #[arg(short, long)]
        wallet: String,
    },
}
