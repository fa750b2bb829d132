//! Campaign Commands

use clap::Subcommand;

use crate::error::{CliError, CliResult};

#[derive(Subcommand, Debug)]
pub enum CampaignCommands {
    /// Create a campaign
    Create {
        /// Creator wallet address
        #[arg(long)]
        creator: String,
        /// Campaign title
        #[arg(short, long)]
        title: String,
        /// Campaign description
        #[arg(short, long)]
        description: String,
        /// Funding goal in the smallest currency unit
        #[arg(short, long)]
        goal: String,
        /// Contact email
        #[arg(short, long)]
        email: String,
        /// Deadline (RFC 3339)
        #[arg(long)]
        deadline: Option<String>,
        /// Category
        #[arg(long)]
        category: Option<String>,
        /// Milestone as TITLE=AMOUNT, repeatable, in order
        #[arg(short, long = "milestone")]
        milestones: Vec<String>,
    },

    /// List campaigns
    List {
        /// Filter by status (ACTIVE, FULFILLED, FAILED, CLOSED)
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by creator wallet
        #[arg(long)]
        creator: Option<String>,
        /// Hide fulfilled campaigns
        #[arg(long)]
        exclude_fulfilled: bool,
    },

    /// Show a campaign with milestones and contributions
    Get {
        /// Campaign ID
        id: String,
    },

    /// Close a campaign
    Close {
        /// Campaign ID
        id: String,
        /// Wallet of the requester (must be the creator)
        #[arg(short, long)]
        requester: Option<String>,
    },

    /// Post a news update
    Update {
        /// Campaign ID
        id: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        content: String,
    },
}

/// Parse a `TITLE=AMOUNT` milestone argument
pub fn parse_milestone(raw: &str) -> CliResult<(String, String)> {
    let (title, amount) = raw
        .rsplit_once('=')
        .ok_or_else(|| CliError::invalid_arg(format!("milestone must look like TITLE=AMOUNT, got '{}'", raw)))?;

    let title = title.trim();
    let amount = amount.trim();
    if title.is_empty() || amount.is_empty() {
        return Err(CliError::invalid_arg(format!(
            "milestone must look like TITLE=AMOUNT, got '{}'",
            raw
        )));
    }

    Ok((title.to_string(), amount.to_string()))
}
