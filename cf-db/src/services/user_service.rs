//! User Service
//!
//! Wallet-based connect and profile lookup.

use std::sync::Arc;
use tracing::info;

use cf_core::{
    CampaignFilter, ContributionFilter, LedgerError, LedgerResult, User, UserProfile,
};

use crate::retry::RetryPolicy;
use crate::store::LedgerStore;
use crate::validation::{parse_wallet, validate_profile};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn LedgerStore>,
    retry: RetryPolicy,
}

impl UserService {
    pub fn new(store: Arc<dyn LedgerStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Create the user on first connect, otherwise apply the provided
    /// non-blank profile fields
    pub async fn connect(
        &self,
        wallet: Option<&str>,
        email: Option<&str>,
        username: Option<&str>,
    ) -> LedgerResult<User> {
        let wallet = parse_wallet(wallet, "walletAddress")?;
        let profile = validate_profile(email, username);

        let user = self
            .retry
            .strict("upsert_user", || self.store.upsert_user(&wallet, &profile))
            .await?;

        info!(wallet = %user.wallet_address, "Wallet connected");
        Ok(user)
    }

    /// User with owned campaigns and activity counts
    pub async fn profile(&self, wallet: Option<&str>) -> LedgerResult<UserProfile> {
        let wallet = parse_wallet(wallet, "walletAddress")?;

        let user = self
            .retry
            .strict("get_user", || self.store.get_user(&wallet))
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("user {}", wallet)))?;

        let campaign_filter = CampaignFilter {
            creator_wallet: Some(wallet.clone()),
            ..Default::default()
        };
        let campaigns = self
            .retry
            .strict("list_campaigns", || self.store.list_campaigns(&campaign_filter))
            .await?;

        let contribution_filter = ContributionFilter::for_donor(&wallet);
        let contributions = self
            .retry
            .strict("list_contributions", || {
                self.store.list_contributions(&contribution_filter)
            })
            .await?;

        Ok(UserProfile {
            campaign_count: campaigns.len() as u64,
            contribution_count: contributions.len() as u64,
            campaigns,
            user,
        })
    }
}
