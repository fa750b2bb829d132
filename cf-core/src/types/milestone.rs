//! Milestone types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Amount, CampaignId, MilestoneId};

/// Ordered funding sub-goal of a campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub campaign_id: CampaignId,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Amount,
    /// Position within the campaign, starting at 0
    pub order: u32,
    pub is_reached: bool,
    pub reached_at: Option<DateTime<Utc>>,
}

impl Milestone {
    pub fn new(campaign_id: &CampaignId, draft: MilestoneDraft, order: u32) -> Self {
        Self {
            id: MilestoneId::generate(),
            campaign_id: campaign_id.clone(),
            title: draft.title,
            description: draft.description,
            target_amount: draft.target_amount,
            order,
            is_reached: false,
            reached_at: None,
        }
    }

    /// Mark as reached if `total` covers the target.
    ///
    /// Returns true only on the call that flips the flag; a reached
    /// milestone is never touched again.
    pub fn try_reach(&mut self, total: Amount, at: DateTime<Utc>) -> bool {
        if self.is_reached || self.target_amount > total {
            return false;
        }
        self.is_reached = true;
        self.reached_at = Some(at);
        true
    }
}

/// Validated input for a milestone
#[derive(Debug, Clone)]
pub struct MilestoneDraft {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Amount,
}
