//! Campaign funding state machine
//!
//! The aggregator and milestone evaluator as pure functions over in-memory
//! records. Stores call [`apply_contribution`] inside their unit of work and
//! persist whatever it mutated; nothing here touches storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::types::{Amount, Campaign, CampaignStatus, Contribution, Milestone};

/// What a single contribution changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundingOutcome {
    /// The campaign moved Active -> Fulfilled in this call
    pub became_fulfilled: bool,
    /// Indices into the (sorted) milestone slice that were reached in this call
    pub reached: Vec<usize>,
}

/// Apply one contribution amount to a campaign and its milestones.
///
/// Milestones are sorted by order index first, so `outcome.reached` is
/// ascending and deterministic. On error nothing has been mutated.
pub fn apply_contribution(
    campaign: &mut Campaign,
    milestones: &mut [Milestone],
    amount: Amount,
    at: DateTime<Utc>,
) -> LedgerResult<FundingOutcome> {
    if amount.is_zero() {
        return Err(LedgerError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    if let Some(stray) = milestones.iter().find(|m| m.campaign_id != campaign.id) {
        return Err(LedgerError::Fatal(format!(
            "milestone {} does not belong to campaign {}",
            stray.id, campaign.id
        )));
    }

    let new_total = campaign.current_amount.checked_add(amount).ok_or_else(|| {
        LedgerError::Validation(format!(
            "amount {} overflows the running total of campaign {}",
            amount, campaign.id
        ))
    })?;

    let mut outcome = FundingOutcome::default();

    // Aggregator
    campaign.current_amount = new_total;
    campaign.contribution_count += 1;
    campaign.updated_at = at;
    if campaign.status == CampaignStatus::Active && new_total >= campaign.goal_amount {
        campaign.status = CampaignStatus::Fulfilled;
        campaign.fulfilled_at = Some(at);
        outcome.became_fulfilled = true;
    }

    // Milestone evaluator
    milestones.sort_by_key(|m| m.order);
    for (index, milestone) in milestones.iter_mut().enumerate() {
        if milestone.try_reach(new_total, at) {
            outcome.reached.push(index);
        }
    }

    Ok(outcome)
}

/// Result of recording one contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingReceipt {
    pub contribution: Contribution,
    /// Campaign after the aggregate update
    pub campaign: Campaign,
    /// Milestones whose reached flag flipped in this call, ascending order
    pub reached_milestones: Vec<Milestone>,
    /// The campaign moved Active -> Fulfilled in this call
    pub became_fulfilled: bool,
}
