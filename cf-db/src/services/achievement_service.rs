//! Achievement Service
//!
//! Fulfilled campaigns of a creator. The listing is fail-soft: when the
//! retry policy's read behaviour is `EmptyResult`, exhausted transient
//! faults yield an empty list.

use std::sync::Arc;
use tracing::debug;

use cf_core::{Campaign, CampaignFilter, CampaignStatus, LedgerResult};

use crate::retry::RetryPolicy;
use crate::store::LedgerStore;
use crate::validation::parse_wallet;

#[derive(Clone)]
pub struct AchievementService {
    store: Arc<dyn LedgerStore>,
    retry: RetryPolicy,
}

impl AchievementService {
    pub fn new(store: Arc<dyn LedgerStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Fulfilled campaigns created by `wallet`, most recently fulfilled first
    pub async fn for_creator(&self, wallet: Option<&str>) -> LedgerResult<Vec<Campaign>> {
        let wallet = parse_wallet(wallet, "wallet")?;
        let filter = CampaignFilter {
            status: Some(CampaignStatus::Fulfilled),
            creator_wallet: Some(wallet),
            exclude_fulfilled: false,
        };

        let mut campaigns = self
            .retry
            .read("list_achievements", || self.store.list_campaigns(&filter))
            .await?;
        campaigns.sort_by(|a, b| {
            b.fulfilled_at
                .cmp(&a.fulfilled_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        debug!(count = campaigns.len(), "Achievements loaded");
        Ok(campaigns)
    }
}
