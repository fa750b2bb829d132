//! Contribution types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Amount, CampaignId, ContributionId, EventId, WalletAddress};

/// A recorded funding event. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: ContributionId,
    pub campaign_id: CampaignId,
    pub donor_wallet: WalletAddress,
    pub amount: Amount,
    /// Idempotency key, unique across all contributions
    pub event_id: EventId,
    pub block_number: Option<u64>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated input for the contribution recorder
#[derive(Debug, Clone)]
pub struct ContributionDraft {
    pub campaign_id: CampaignId,
    pub donor_wallet: WalletAddress,
    pub amount: Amount,
    pub event_id: EventId,
    pub block_number: Option<u64>,
    pub is_anonymous: bool,
}

impl ContributionDraft {
    pub fn into_contribution(self, id: ContributionId, at: DateTime<Utc>) -> Contribution {
        Contribution {
            id,
            campaign_id: self.campaign_id,
            donor_wallet: self.donor_wallet,
            amount: self.amount,
            event_id: self.event_id,
            block_number: self.block_number,
            is_anonymous: self.is_anonymous,
            created_at: at,
        }
    }
}

/// Contribution listing filter
#[derive(Debug, Clone, Default)]
pub struct ContributionFilter {
    pub campaign_id: Option<CampaignId>,
    pub donor_wallet: Option<WalletAddress>,
}

impl ContributionFilter {
    pub fn for_campaign(campaign_id: &CampaignId) -> Self {
        Self {
            campaign_id: Some(campaign_id.clone()),
            donor_wallet: None,
        }
    }

    pub fn for_donor(donor_wallet: &WalletAddress) -> Self {
        Self {
            campaign_id: None,
            donor_wallet: Some(donor_wallet.clone()),
        }
    }

    pub fn matches(&self, contribution: &Contribution) -> bool {
        if let Some(campaign_id) = &self.campaign_id {
            if &contribution.campaign_id != campaign_id {
                return false;
            }
        }
        if let Some(donor) = &self.donor_wallet {
            if &contribution.donor_wallet != donor {
                return false;
            }
        }
        true
    }
}
