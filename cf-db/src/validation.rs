//! Input validation
//!
//! Turns caller-supplied fields into the validated drafts the store
//! accepts. Every failure is `LedgerError::Validation` and happens before
//! storage is touched.

use chrono::{DateTime, Utc};

use cf_core::{
    Amount, CampaignDraft, CampaignPatch, CampaignStatus, ContributionDraft, CampaignId,
    EventId, LedgerError, LedgerResult, MilestoneDraft, ProfileUpdate, WalletAddress,
};

/// Upper bound on milestones per campaign
pub const MAX_MILESTONES: usize = 64;

/// Raw contribution request
#[derive(Debug, Clone, Default)]
pub struct ContributionInput {
    pub campaign_id: Option<String>,
    pub donor_wallet: Option<String>,
    /// String-encoded non-negative integer in the smallest currency unit
    pub amount: Option<String>,
    /// External event identifier, e.g. a transaction hash
    pub event_id: Option<String>,
    pub block_number: Option<u64>,
    pub is_anonymous: Option<bool>,
}

/// Raw milestone in a campaign request
#[derive(Debug, Clone, Default)]
pub struct MilestoneInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<String>,
}

/// Raw campaign creation request
#[derive(Debug, Clone, Default)]
pub struct CampaignInput {
    pub creator_wallet: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<String>,
    pub email: Option<String>,
    /// RFC 3339 timestamp
    pub deadline: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub milestones: Vec<MilestoneInput>,
}

/// Raw owner edit. For nullable fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct CampaignPatchInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub category: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub deadline: Option<Option<String>>,
    pub status: Option<String>,
}

/// Required, non-blank text field
pub fn required_text(raw: Option<&str>, field: &str) -> LedgerResult<String> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(LedgerError::Validation(format!("{} is required", field))),
    }
}

/// Optional text field; blank counts as absent
pub fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn parse_wallet(raw: Option<&str>, field: &str) -> LedgerResult<WalletAddress> {
    WalletAddress::parse(raw.unwrap_or_default(), field)
}

pub fn parse_campaign_id(raw: Option<&str>, field: &str) -> LedgerResult<CampaignId> {
    required_text(raw, field).map(CampaignId::new)
}

pub fn parse_timestamp(raw: &str, field: &str) -> LedgerResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LedgerError::Validation(format!("{} is not an RFC 3339 timestamp: {}", field, e)))
}

pub fn validate_contribution(input: &ContributionInput) -> LedgerResult<ContributionDraft> {
    let campaign_id = parse_campaign_id(input.campaign_id.as_deref(), "campaignId")?;
    let donor_wallet = parse_wallet(input.donor_wallet.as_deref(), "donorWallet")?;
    let amount = required_text(input.amount.as_deref(), "amount")
        .and_then(|raw| Amount::parse_positive(&raw, "amount"))?;
    let event_id = EventId::parse(input.event_id.as_deref().unwrap_or_default(), "transactionHash")?;

    Ok(ContributionDraft {
        campaign_id,
        donor_wallet,
        amount,
        event_id,
        block_number: input.block_number,
        is_anonymous: input.is_anonymous.unwrap_or(false),
    })
}

pub fn validate_milestone(input: &MilestoneInput, index: usize) -> LedgerResult<MilestoneDraft> {
    let title = required_text(input.title.as_deref(), &format!("milestones[{}].title", index))?;
    let field = format!("milestones[{}].targetAmount", index);
    let target_amount = required_text(input.target_amount.as_deref(), &field)
        .and_then(|raw| Amount::parse_positive(&raw, &field))?;

    Ok(MilestoneDraft {
        title,
        description: optional_text(input.description.as_deref()),
        target_amount,
    })
}

pub fn validate_campaign(input: &CampaignInput) -> LedgerResult<CampaignDraft> {
    let creator_wallet = parse_wallet(input.creator_wallet.as_deref(), "creatorWallet")?;
    let title = required_text(input.title.as_deref(), "title")?;
    let description = required_text(input.description.as_deref(), "description")?;
    let goal_amount = required_text(input.goal_amount.as_deref(), "goalAmount")
        .and_then(|raw| Amount::parse_positive(&raw, "goalAmount"))?;
    let email = required_text(input.email.as_deref(), "email")?;
    let deadline = optional_text(input.deadline.as_deref())
        .map(|raw| parse_timestamp(&raw, "deadline"))
        .transpose()?;

    if input.milestones.len() > MAX_MILESTONES {
        return Err(LedgerError::Validation(format!(
            "at most {} milestones are allowed, got {}",
            MAX_MILESTONES,
            input.milestones.len()
        )));
    }
    let milestones = input
        .milestones
        .iter()
        .enumerate()
        .map(|(index, m)| validate_milestone(m, index))
        .collect::<LedgerResult<Vec<_>>>()?;

    Ok(CampaignDraft {
        creator_wallet,
        title,
        description,
        goal_amount,
        email,
        category: optional_text(input.category.as_deref()),
        image_url: optional_text(input.image_url.as_deref()),
        deadline,
        milestones,
    })
}

pub fn validate_campaign_patch(input: &CampaignPatchInput) -> LedgerResult<CampaignPatch> {
    let title = input
        .title
        .as_deref()
        .map(|raw| required_text(Some(raw), "title"))
        .transpose()?;
    let description = input
        .description
        .as_deref()
        .map(|raw| required_text(Some(raw), "description"))
        .transpose()?;
    let email = input
        .email
        .as_deref()
        .map(|raw| required_text(Some(raw), "email"))
        .transpose()?;
    let deadline = match &input.deadline {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) if raw.trim().is_empty() => Some(None),
        Some(Some(raw)) => Some(Some(parse_timestamp(raw, "deadline")?)),
    };
    let status = input
        .status
        .as_deref()
        .map(str::parse::<CampaignStatus>)
        .transpose()?;

    Ok(CampaignPatch {
        title,
        description,
        email,
        category: input.category.as_ref().map(|c| optional_text(c.as_deref())),
        image_url: input.image_url.as_ref().map(|u| optional_text(u.as_deref())),
        deadline,
        status,
    })
}

/// Campaign news post; both fields required
pub fn validate_update(title: Option<&str>, content: Option<&str>) -> LedgerResult<(String, String)> {
    Ok((
        required_text(title, "title")?,
        required_text(content, "content")?,
    ))
}

/// Profile fields supplied on connect; blanks are ignored
pub fn validate_profile(email: Option<&str>, username: Option<&str>) -> ProfileUpdate {
    ProfileUpdate {
        email: optional_text(email),
        username: optional_text(username),
    }
}
