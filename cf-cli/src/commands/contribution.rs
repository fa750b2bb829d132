//! Contribution Commands

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum ContributionCommands {
    /// Record a confirmed on-chain contribution
    Record {
        /// Campaign ID
        #[arg(short, long)]
        campaign: String,
        /// Donor wallet address
        #[arg(short, long)]
        donor: String,
        /// Amount in the smallest currency unit
        #[arg(short, long)]
        amount: String,
        /// Transaction hash identifying the funding event
        #[arg(short, long)]
        tx_hash: String,
        /// Block the event was confirmed in
        #[arg(short, long)]
        block_number: Option<u64>,
        /// Hide the donor in public listings
        #[arg(long)]
        anonymous: bool,
    },

    /// List contributions, newest first
    List {
        /// Filter by campaign
        #[arg(short, long)]
        campaign: Option<String>,
        /// Filter by donor wallet
        #[arg(short, long)]
        donor: Option<String>,
    },
}
