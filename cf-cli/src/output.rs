//! Output Formatting

use crate::client::{
    CampaignDetail, CampaignSummary, ContributionSummary, HealthResponse, RecordResult,
    UpdateSummary, UserProfile, UserSummary,
};
use crate::commands::OutputFormat;
use serde::Serialize;

/// Print as JSON
pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error formatting JSON: {}", e),
    }
}

pub fn print_health(health: &HealthResponse, ready: Option<&HealthResponse>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "health": health, "ready": ready })),
        OutputFormat::Table => {
            println!("Crowdfunding Ledger");
            println!("===================");
            println!("Status:  {}", health.status);
            println!("Version: {}", health.version);
            println!("Backend: {}", health.backend);
            println!("Client:  {}", crate::VERSION);
            match ready {
                Some(ready) => println!("Store:   {}", ready.status),
                None => println!("Store:   unreachable"),
            }
        }
    }
}

fn campaign_line(c: &CampaignSummary) -> String {
    format!(
        "{}  {:<10} {:>4}%  {}/{}  {}",
        c.id, c.status, c.progress_percent, c.current_amount, c.goal_amount, c.title
    )
}

pub fn print_campaigns(campaigns: &[CampaignSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&campaigns),
        OutputFormat::Table => {
            println!("Found {} campaigns:", campaigns.len());
            for campaign in campaigns {
                println!("  {}", campaign_line(campaign));
            }
        }
    }
}

pub fn print_campaign(campaign: &CampaignSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(campaign),
        OutputFormat::Table => println!("{}", campaign_line(campaign)),
    }
}

pub fn print_campaign_detail(detail: &CampaignDetail, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(detail),
        OutputFormat::Table => {
            let c = &detail.campaign;
            println!("Campaign: {}", c.id);
            println!("  Title:    {}", c.title);
            println!("  Creator:  {}", c.creator_wallet);
            println!("  Status:   {}", c.status);
            println!("  Raised:   {} / {} ({}%)", c.current_amount, c.goal_amount, c.progress_percent);
            if let Some(at) = &c.fulfilled_at {
                println!("  Fulfilled: {}", at);
            }

            if !detail.milestones.is_empty() {
                println!("  Milestones:");
                for m in &detail.milestones {
                    let mark = if m.is_reached { "x" } else { " " };
                    println!("    [{}] {}. {} ({})", mark, m.order, m.title, m.target_amount);
                }
            }
            if !detail.transactions.is_empty() {
                println!("  Contributions:");
                for t in &detail.transactions {
                    println!("    {}", contribution_line(t));
                }
            }
            if !detail.updates.is_empty() {
                println!("  Updates:");
                for u in &detail.updates {
                    println!("    {}  {}", u.created_at, u.title);
                }
            }
        }
    }
}

fn contribution_line(t: &ContributionSummary) -> String {
    format!(
        "{}  {:>12}  {}  {}",
        t.created_at,
        t.amount,
        t.donor_wallet.as_deref().unwrap_or("anonymous"),
        t.transaction_hash
    )
}

pub fn print_contributions(contributions: &[ContributionSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&contributions),
        OutputFormat::Table => {
            println!("Found {} contributions:", contributions.len());
            for t in contributions {
                println!("  {}", contribution_line(t));
            }
        }
    }
}

pub fn print_record_result(result: &RecordResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Table => {
            println!("Contribution recorded");
            println!("  ID:       {}", result.transaction.id);
            println!("  Event:    {}", result.transaction.transaction_hash);
            println!("  Amount:   {}", result.transaction.amount);
            println!("  Campaign: {}", campaign_line(&result.campaign));
            for m in &result.reached_milestones {
                println!("  Milestone reached: {} ({})", m.title, m.target_amount);
            }
        }
    }
}

pub fn print_update(update: &UpdateSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(update),
        OutputFormat::Table => println!("Update {} posted: {}", update.id, update.title),
    }
}

pub fn print_user(user: &UserSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(user),
        OutputFormat::Table => {
            println!("User: {}", user.wallet_address);
            println!("  Username: {}", user.username.as_deref().unwrap_or("-"));
            println!("  Email:    {}", user.email.as_deref().unwrap_or("-"));
        }
    }
}

pub fn print_profile(profile: &UserProfile, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(profile),
        OutputFormat::Table => {
            print_user(&profile.user, format);
            println!(
                "  Campaigns: {}  Contributions: {}",
                profile.count.campaigns, profile.count.transactions
            );
            for campaign in &profile.campaigns {
                println!("    {}", campaign_line(campaign));
            }
        }
    }
}
