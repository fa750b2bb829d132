//! Funding Service
//!
//! Entry point for recording contributions. Validates the request, runs
//! the store's recorder/aggregator/evaluator unit of work under the retry
//! policy and logs what changed.

use std::sync::Arc;
use tracing::{debug, info, warn};

use cf_core::{
    Contribution, ContributionFilter, EventId, FundingReceipt, LedgerError, LedgerResult,
};

use crate::retry::RetryPolicy;
use crate::store::LedgerStore;
use crate::validation::{optional_text, validate_contribution, ContributionInput};

/// Funding Service
#[derive(Clone)]
pub struct FundingService {
    store: Arc<dyn LedgerStore>,
    retry: RetryPolicy,
}

impl FundingService {
    pub fn new(store: Arc<dyn LedgerStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Record one contribution.
    ///
    /// A transient fault after the commit reached the store surfaces on
    /// retry as `DuplicateEvent`, so retrying the write never double counts.
    pub async fn record(&self, input: &ContributionInput) -> LedgerResult<FundingReceipt> {
        let draft = validate_contribution(input)?;

        let result = self
            .retry
            .strict("record_contribution", || {
                self.store.record_contribution(&draft)
            })
            .await;

        match &result {
            Ok(receipt) => {
                info!(
                    campaign_id = %receipt.campaign.id,
                    event_id = %receipt.contribution.event_id,
                    amount = %receipt.contribution.amount,
                    total = %receipt.campaign.current_amount,
                    "Contribution recorded"
                );
                if receipt.became_fulfilled {
                    info!(
                        campaign_id = %receipt.campaign.id,
                        goal = %receipt.campaign.goal_amount,
                        "Campaign fulfilled"
                    );
                }
                for milestone in &receipt.reached_milestones {
                    info!(
                        campaign_id = %milestone.campaign_id,
                        order = milestone.order,
                        target = %milestone.target_amount,
                        "Milestone reached"
                    );
                }
            }
            Err(LedgerError::DuplicateEvent(_)) => {
                debug!(event_id = %draft.event_id, "Duplicate contribution event rejected");
            }
            Err(LedgerError::NotFound(_)) => {
                debug!(campaign_id = %draft.campaign_id, "Contribution for unknown campaign");
            }
            Err(e) => {
                warn!(
                    campaign_id = %draft.campaign_id,
                    event_id = %draft.event_id,
                    error = %e,
                    "Contribution failed"
                );
            }
        }

        result
    }

    /// Contributions filtered by campaign and/or donor, newest first
    pub async fn list(
        &self,
        campaign_id: Option<&str>,
        donor_wallet: Option<&str>,
    ) -> LedgerResult<Vec<Contribution>> {
        let filter = ContributionFilter {
            campaign_id: optional_text(campaign_id).map(cf_core::CampaignId::new),
            donor_wallet: optional_text(donor_wallet)
                .map(|raw| cf_core::WalletAddress::parse(&raw, "donorWallet"))
                .transpose()?,
        };

        self.retry
            .read("list_contributions", || self.store.list_contributions(&filter))
            .await
    }

    pub async fn get_by_event(&self, event_id: &str) -> LedgerResult<Contribution> {
        let event_id = EventId::parse(event_id, "transactionHash")?;
        self.retry
            .strict("get_contribution_by_event", || {
                self.store.get_contribution_by_event(&event_id)
            })
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("contribution for event {}", event_id)))
    }
}
