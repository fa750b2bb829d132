//! Campaign Service
//!
//! Creation, owner edits, deletion and news posts for campaigns, plus the
//! detail and listing reads.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use cf_core::{
    Campaign, CampaignDetail, CampaignFilter, CampaignId, CampaignPatch, CampaignStatus,
    CampaignUpdate, ContributionFilter, LedgerError, LedgerResult, Milestone, ProfileUpdate,
    WalletAddress,
};

use crate::retry::RetryPolicy;
use crate::store::LedgerStore;
use crate::validation::{
    optional_text, validate_campaign, validate_campaign_patch, validate_update, CampaignInput,
    CampaignPatchInput,
};

/// Raw listing query
#[derive(Debug, Clone, Default)]
pub struct CampaignQuery {
    pub status: Option<String>,
    pub creator_wallet: Option<String>,
    pub exclude_fulfilled: bool,
}

/// Campaign Service
#[derive(Clone)]
pub struct CampaignService {
    store: Arc<dyn LedgerStore>,
    retry: RetryPolicy,
}

impl CampaignService {
    pub fn new(store: Arc<dyn LedgerStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Create a campaign with its milestones.
    ///
    /// The creator's user record is created on demand.
    pub async fn create(&self, input: &CampaignInput) -> LedgerResult<(Campaign, Vec<Milestone>)> {
        let draft = validate_campaign(input)?;
        let creator = draft.creator_wallet.clone();
        let (campaign, milestones) = draft.into_records(CampaignId::generate(), Utc::now());
        let no_profile = ProfileUpdate::default();

        self.retry
            .strict("upsert_user", || self.store.upsert_user(&creator, &no_profile))
            .await?;
        self.retry
            .strict("insert_campaign", || {
                self.store.insert_campaign(&campaign, &milestones)
            })
            .await?;

        info!(
            campaign_id = %campaign.id,
            wallet = %campaign.creator_wallet,
            goal = %campaign.goal_amount,
            milestones = milestones.len(),
            "Campaign created"
        );
        Ok((campaign, milestones))
    }

    pub async fn get(&self, id: &str) -> LedgerResult<Campaign> {
        let id = CampaignId::new(id);
        self.retry
            .strict("get_campaign", || self.store.get_campaign(&id))
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("campaign {}", id)))
    }

    /// Campaign with creator, contributions, milestones and updates
    pub async fn detail(&self, id: &str) -> LedgerResult<CampaignDetail> {
        let campaign = self.get(id).await?;
        let id = &campaign.id;
        let contribution_filter = ContributionFilter::for_campaign(id);

        let creator = self
            .retry
            .strict("get_user", || self.store.get_user(&campaign.creator_wallet))
            .await?;
        let contributions = self
            .retry
            .strict("list_contributions", || {
                self.store.list_contributions(&contribution_filter)
            })
            .await?;
        let milestones = self
            .retry
            .strict("list_milestones", || self.store.list_milestones(id))
            .await?;
        let updates = self
            .retry
            .strict("list_updates", || self.store.list_updates(id))
            .await?;

        Ok(CampaignDetail {
            creator,
            contributions,
            milestones,
            updates,
            campaign,
        })
    }

    /// Campaigns matching the query, newest first
    pub async fn list(&self, query: &CampaignQuery) -> LedgerResult<Vec<Campaign>> {
        let filter = CampaignFilter {
            status: optional_text(query.status.as_deref())
                .map(|raw| raw.parse::<CampaignStatus>())
                .transpose()?,
            creator_wallet: optional_text(query.creator_wallet.as_deref())
                .map(|raw| WalletAddress::parse(&raw, "creatorWallet"))
                .transpose()?,
            exclude_fulfilled: query.exclude_fulfilled,
        };
        debug!(?filter, "Listing campaigns");

        self.retry
            .read("list_campaigns", || self.store.list_campaigns(&filter))
            .await
    }

    /// Owner edit. `requester`, when given, must be the creator.
    pub async fn update(
        &self,
        id: &str,
        requester: Option<&str>,
        input: &CampaignPatchInput,
    ) -> LedgerResult<Campaign> {
        let patch = validate_campaign_patch(input)?;
        if patch.is_empty() {
            return Err(LedgerError::Validation("no fields to update".to_string()));
        }
        self.apply_patch(id, requester, &patch).await
    }

    /// Move the campaign to Closed
    pub async fn close(&self, id: &str, requester: Option<&str>) -> LedgerResult<Campaign> {
        self.apply_patch(id, requester, &CampaignPatch::close()).await
    }

    async fn apply_patch(
        &self,
        id: &str,
        requester: Option<&str>,
        patch: &CampaignPatch,
    ) -> LedgerResult<Campaign> {
        let id = CampaignId::new(id);
        let requester = parse_requester(requester)?;

        let campaign = self
            .retry
            .strict("update_campaign", || {
                self.store.update_campaign(&id, requester.as_ref(), patch)
            })
            .await?;

        info!(campaign_id = %campaign.id, status = %campaign.status, "Campaign updated");
        Ok(campaign)
    }

    pub async fn delete(&self, id: &str, requester: Option<&str>) -> LedgerResult<()> {
        let id = CampaignId::new(id);
        let requester = parse_requester(requester)?;

        self.retry
            .strict("delete_campaign", || {
                self.store.delete_campaign(&id, requester.as_ref())
            })
            .await?;

        info!(campaign_id = %id, "Campaign deleted");
        Ok(())
    }

    /// Post a news update on a campaign
    pub async fn post_update(
        &self,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> LedgerResult<CampaignUpdate> {
        let (title, content) = validate_update(title, content)?;
        let update = CampaignUpdate::new(CampaignId::new(id), title, content, Utc::now());

        self.retry
            .strict("insert_update", || self.store.insert_update(&update))
            .await?;

        info!(campaign_id = %update.campaign_id, update_id = %update.id, "Campaign update posted");
        Ok(update)
    }
}

fn parse_requester(raw: Option<&str>) -> LedgerResult<Option<WalletAddress>> {
    optional_text(raw)
        .map(|wallet| WalletAddress::parse(&wallet, "requesterWallet"))
        .transpose()
}
