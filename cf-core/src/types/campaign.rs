//! Campaign types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::common::{Amount, CampaignId, WalletAddress};
use super::contribution::Contribution;
use super::milestone::{Milestone, MilestoneDraft};
use super::update::CampaignUpdate;
use super::user::User;
use crate::error::{LedgerError, LedgerResult};

/// Campaign lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Active,
    Fulfilled,
    Failed,
    Closed,
}

impl Default for CampaignStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "ACTIVE",
            CampaignStatus::Fulfilled => "FULFILLED",
            CampaignStatus::Failed => "FAILED",
            CampaignStatus::Closed => "CLOSED",
        }
    }
}

impl FromStr for CampaignStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(CampaignStatus::Active),
            "fulfilled" => Ok(CampaignStatus::Fulfilled),
            "failed" => Ok(CampaignStatus::Failed),
            "closed" => Ok(CampaignStatus::Closed),
            other => Err(LedgerError::Validation(format!("Invalid campaign status: {}", other))),
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fundraising campaign
///
/// `current_amount`, `contribution_count` and `fulfilled_at` are aggregate
/// fields owned by the funding ledger; owner edits never touch them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub creator_wallet: WalletAddress,
    pub title: String,
    pub description: String,
    pub goal_amount: Amount,
    pub current_amount: Amount,
    pub status: CampaignStatus,
    pub email: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub contribution_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
}

impl Campaign {
    /// Funding progress in whole percent (0 when the goal is zero)
    pub fn progress_percent(&self) -> u128 {
        if self.goal_amount.is_zero() {
            return 0;
        }
        self.current_amount.value().saturating_mul(100) / self.goal_amount.value()
    }

    pub fn is_deadline_passed(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => deadline < now,
            None => false,
        }
    }

    /// Check that `requester` may mutate this campaign.
    ///
    /// An absent requester is accepted; the HTTP layer decides whether a
    /// requester wallet is mandatory.
    pub fn ensure_owner(&self, requester: Option<&WalletAddress>) -> LedgerResult<()> {
        match requester {
            Some(wallet) if wallet != &self.creator_wallet => Err(LedgerError::Forbidden(format!(
                "{} is not the creator of campaign {}",
                wallet, self.id
            ))),
            _ => Ok(()),
        }
    }

    /// Apply an owner edit
    pub fn apply_patch(&mut self, patch: &CampaignPatch, at: DateTime<Utc>) -> LedgerResult<()> {
        if let Some(status) = patch.status {
            self.check_status_change(status)?;
        }

        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = image_url.clone();
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = at;
        Ok(())
    }

    fn check_status_change(&self, to: CampaignStatus) -> LedgerResult<()> {
        if to == self.status {
            return Ok(());
        }
        match (self.status, to) {
            (_, CampaignStatus::Fulfilled) => Err(LedgerError::Conflict(
                "FULFILLED is reached through contributions only".to_string(),
            )),
            (CampaignStatus::Fulfilled, CampaignStatus::Closed) => Ok(()),
            (CampaignStatus::Fulfilled, other) => Err(LedgerError::Conflict(format!(
                "Fulfilled campaign {} cannot move to {}",
                self.id, other
            ))),
            _ => Ok(()),
        }
    }
}

/// Validated input for a new campaign
#[derive(Debug, Clone)]
pub struct CampaignDraft {
    pub creator_wallet: WalletAddress,
    pub title: String,
    pub description: String,
    pub goal_amount: Amount,
    pub email: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub milestones: Vec<MilestoneDraft>,
}

impl CampaignDraft {
    /// Materialize the campaign and its milestones.
    ///
    /// Milestones receive their order index from their position in the draft.
    pub fn into_records(self, id: CampaignId, at: DateTime<Utc>) -> (Campaign, Vec<Milestone>) {
        let milestones = self
            .milestones
            .into_iter()
            .enumerate()
            .map(|(index, draft)| Milestone::new(&id, draft, index as u32))
            .collect();

        let campaign = Campaign {
            id,
            creator_wallet: self.creator_wallet,
            title: self.title,
            description: self.description,
            goal_amount: self.goal_amount,
            current_amount: Amount::ZERO,
            status: CampaignStatus::Active,
            email: self.email,
            category: self.category,
            image_url: self.image_url,
            deadline: self.deadline,
            contribution_count: 0,
            created_at: at,
            updated_at: at,
            fulfilled_at: None,
        };

        (campaign, milestones)
    }
}

/// Owner edit of a campaign
///
/// `None` leaves a field untouched. For the nullable fields the inner
/// option sets or clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub category: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub status: Option<CampaignStatus>,
}

impl CampaignPatch {
    pub fn close() -> Self {
        Self {
            status: Some(CampaignStatus::Closed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &CampaignPatch::default()
    }
}

/// Campaign listing filter
#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    pub status: Option<CampaignStatus>,
    pub creator_wallet: Option<WalletAddress>,
    pub exclude_fulfilled: bool,
}

impl CampaignFilter {
    pub fn matches(&self, campaign: &Campaign) -> bool {
        if let Some(status) = self.status {
            if campaign.status != status {
                return false;
            }
        }
        if let Some(creator) = &self.creator_wallet {
            if &campaign.creator_wallet != creator {
                return false;
            }
        }
        !(self.exclude_fulfilled && campaign.status == CampaignStatus::Fulfilled)
    }
}

/// Full campaign view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDetail {
    pub campaign: Campaign,
    pub creator: Option<User>,
    /// Newest first
    pub contributions: Vec<Contribution>,
    /// Ascending order index
    pub milestones: Vec<Milestone>,
    /// Newest first
    pub updates: Vec<CampaignUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(s: &str) -> WalletAddress {
        WalletAddress::parse(s, "wallet").unwrap()
    }

    fn draft() -> CampaignDraft {
        CampaignDraft {
            creator_wallet: wallet("0xAlice"),
            title: "Open toolkit".to_string(),
            description: "Build it".to_string(),
            goal_amount: Amount(1000),
            email: "alice@example.com".to_string(),
            category: Some("Software".to_string()),
            image_url: None,
            deadline: None,
            milestones: vec![
                MilestoneDraft {
                    title: "Prototype".to_string(),
                    description: None,
                    target_amount: Amount(300),
                },
                MilestoneDraft {
                    title: "Release".to_string(),
                    description: Some("v1".to_string()),
                    target_amount: Amount(900),
                },
            ],
        }
    }

    #[test]
    fn test_into_records_orders_milestones() {
        let (campaign, milestones) = draft().into_records(CampaignId::new("c1"), Utc::now());

        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(campaign.current_amount, Amount::ZERO);
        assert_eq!(campaign.creator_wallet.as_str(), "0xalice");
        assert_eq!(milestones.len(), 2);
        assert_eq!(milestones[0].order, 0);
        assert_eq!(milestones[1].order, 1);
        assert!(milestones.iter().all(|m| m.campaign_id == campaign.id && !m.is_reached));
    }

    #[test]
    fn test_progress_percent() {
        let (mut campaign, _) = draft().into_records(CampaignId::new("c1"), Utc::now());
        assert_eq!(campaign.progress_percent(), 0);

        campaign.current_amount = Amount(600);
        assert_eq!(campaign.progress_percent(), 60);

        campaign.current_amount = Amount(1100);
        assert_eq!(campaign.progress_percent(), 110);

        campaign.goal_amount = Amount::ZERO;
        assert_eq!(campaign.progress_percent(), 0);
    }

    #[test]
    fn test_deadline_passed() {
        let now = Utc::now();
        let (mut campaign, _) = draft().into_records(CampaignId::new("c1"), now);
        assert!(!campaign.is_deadline_passed(now));

        campaign.deadline = Some(now - chrono::Duration::days(1));
        assert!(campaign.is_deadline_passed(now));

        campaign.deadline = Some(now + chrono::Duration::days(1));
        assert!(!campaign.is_deadline_passed(now));
    }

    #[test]
    fn test_ensure_owner() {
        let (campaign, _) = draft().into_records(CampaignId::new("c1"), Utc::now());

        assert!(campaign.ensure_owner(None).is_ok());
        assert!(campaign.ensure_owner(Some(&wallet("0xALICE"))).is_ok());
        assert!(matches!(
            campaign.ensure_owner(Some(&wallet("0xBob"))),
            Err(LedgerError::Forbidden(_))
        ));
    }

    #[test]
    fn test_patch_never_sets_fulfilled() {
        let (mut campaign, _) = draft().into_records(CampaignId::new("c1"), Utc::now());
        let patch = CampaignPatch {
            status: Some(CampaignStatus::Fulfilled),
            ..Default::default()
        };
        assert!(matches!(
            campaign.apply_patch(&patch, Utc::now()),
            Err(LedgerError::Conflict(_))
        ));
        assert_eq!(campaign.status, CampaignStatus::Active);
    }

    #[test]
    fn test_patch_fulfilled_cannot_reopen() {
        let (mut campaign, _) = draft().into_records(CampaignId::new("c1"), Utc::now());
        campaign.status = CampaignStatus::Fulfilled;

        let reopen = CampaignPatch {
            status: Some(CampaignStatus::Active),
            ..Default::default()
        };
        assert!(campaign.apply_patch(&reopen, Utc::now()).is_err());

        assert!(campaign.apply_patch(&CampaignPatch::close(), Utc::now()).is_ok());
        assert_eq!(campaign.status, CampaignStatus::Closed);
    }

    #[test]
    fn test_patch_fields() {
        let (mut campaign, _) = draft().into_records(CampaignId::new("c1"), Utc::now());
        let deadline = Utc::now() + chrono::Duration::days(30);
        let patch = CampaignPatch {
            title: Some("New title".to_string()),
            category: Some(None),
            deadline: Some(Some(deadline)),
            ..Default::default()
        };

        campaign.apply_patch(&patch, Utc::now()).unwrap();

        assert_eq!(campaign.title, "New title");
        assert_eq!(campaign.category, None);
        assert_eq!(campaign.deadline, Some(deadline));
        assert_eq!(campaign.description, "Build it");
        assert_eq!(campaign.goal_amount, Amount(1000));
    }

    #[test]
    fn test_filter() {
        let (mut campaign, _) = draft().into_records(CampaignId::new("c1"), Utc::now());

        assert!(CampaignFilter::default().matches(&campaign));

        let by_creator = CampaignFilter {
            creator_wallet: Some(wallet("0xALICE")),
            ..Default::default()
        };
        assert!(by_creator.matches(&campaign));

        let other_creator = CampaignFilter {
            creator_wallet: Some(wallet("0xbob")),
            ..Default::default()
        };
        assert!(!other_creator.matches(&campaign));

        campaign.status = CampaignStatus::Fulfilled;
        let exclude = CampaignFilter {
            exclude_fulfilled: true,
            ..Default::default()
        };
        assert!(!exclude.matches(&campaign));

        let fulfilled = CampaignFilter {
            status: Some(CampaignStatus::Fulfilled),
            ..Default::default()
        };
        assert!(fulfilled.matches(&campaign));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("fulfilled".parse::<CampaignStatus>().unwrap(), CampaignStatus::Fulfilled);
        assert_eq!("ACTIVE".parse::<CampaignStatus>().unwrap(), CampaignStatus::Active);
        assert!("pending".parse::<CampaignStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&CampaignStatus::Closed).unwrap(),
            "\"CLOSED\""
        );
    }
}
