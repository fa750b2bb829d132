//! In-memory store
//!
//! All tables sit behind one `RwLock`, so every write method holds the
//! whole database for its unit of work. Mostly used for tests and
//! development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

use cf_core::{
    apply_contribution, Campaign, CampaignFilter, CampaignId, CampaignPatch, CampaignUpdate,
    Contribution, ContributionDraft, ContributionFilter, ContributionId, EventId, FundingReceipt,
    LedgerError, LedgerResult, Milestone, ProfileUpdate, User, WalletAddress,
};

use super::{
    sort_campaigns_newest_first, sort_contributions_newest_first, sort_updates_newest_first,
    LedgerStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<WalletAddress, User>,
    campaigns: HashMap<CampaignId, Campaign>,
    milestones: HashMap<CampaignId, Vec<Milestone>>,
    contributions: HashMap<ContributionId, Contribution>,
    event_index: HashMap<EventId, ContributionId>,
    updates: HashMap<CampaignId, Vec<CampaignUpdate>>,
}

/// In-memory ledger store
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    tables: RwLock<Tables>,
    /// Calls left that fail with a transient error before touching tables
    pending_faults: AtomicU32,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` store calls fail with `TransientStorage`
    pub fn inject_transient_faults(&self, count: u32) {
        self.pending_faults.store(count, Ordering::SeqCst);
    }

    fn check_fault(&self) -> LedgerResult<()> {
        let tripped = self
            .pending_faults
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            Err(LedgerError::TransientStorage(
                "injected fault: connection reset".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    // ==================== Users ====================

    async fn get_user(&self, wallet: &WalletAddress) -> LedgerResult<Option<User>> {
        self.check_fault()?;
        Ok(self.tables.read().await.users.get(wallet).cloned())
    }

    async fn upsert_user(
        &self,
        wallet: &WalletAddress,
        profile: &ProfileUpdate,
    ) -> LedgerResult<User> {
        self.check_fault()?;
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .entry(wallet.clone())
            .and_modify(|user| {
                user.apply(profile, now);
            })
            .or_insert_with(|| User::new(wallet.clone(), profile, now));
        Ok(user.clone())
    }

    // ==================== Campaigns ====================

    async fn insert_campaign(
        &self,
        campaign: &Campaign,
        milestones: &[Milestone],
    ) -> LedgerResult<()> {
        self.check_fault()?;
        let mut tables = self.tables.write().await;
        if tables.campaigns.contains_key(&campaign.id) {
            return Err(LedgerError::Conflict(format!(
                "campaign {} already exists",
                campaign.id
            )));
        }
        let mut milestones = milestones.to_vec();
        milestones.sort_by_key(|m| m.order);
        tables.campaigns.insert(campaign.id.clone(), campaign.clone());
        tables.milestones.insert(campaign.id.clone(), milestones);
        Ok(())
    }

    async fn get_campaign(&self, id: &CampaignId) -> LedgerResult<Option<Campaign>> {
        self.check_fault()?;
        Ok(self.tables.read().await.campaigns.get(id).cloned())
    }

    async fn list_campaigns(&self, filter: &CampaignFilter) -> LedgerResult<Vec<Campaign>> {
        self.check_fault()?;
        let tables = self.tables.read().await;
        let mut campaigns: Vec<Campaign> = tables
            .campaigns
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        sort_campaigns_newest_first(&mut campaigns);
        Ok(campaigns)
    }

    async fn update_campaign(
        &self,
        id: &CampaignId,
        requester: Option<&WalletAddress>,
        patch: &CampaignPatch,
    ) -> LedgerResult<Campaign> {
        self.check_fault()?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .campaigns
            .get_mut(id)
            .ok_or_else(|| LedgerError::NotFound(format!("campaign {}", id)))?;
        stored.ensure_owner(requester)?;

        // patch a copy so a rejected status change leaves the row untouched
        let mut campaign = stored.clone();
        campaign.apply_patch(patch, Utc::now())?;
        *stored = campaign.clone();
        Ok(campaign)
    }

    async fn delete_campaign(
        &self,
        id: &CampaignId,
        requester: Option<&WalletAddress>,
    ) -> LedgerResult<()> {
        self.check_fault()?;
        let mut tables = self.tables.write().await;
        let campaign = tables
            .campaigns
            .get(id)
            .ok_or_else(|| LedgerError::NotFound(format!("campaign {}", id)))?;
        campaign.ensure_owner(requester)?;
        if campaign.contribution_count > 0 {
            return Err(LedgerError::Conflict(format!(
                "campaign {} has {} recorded contributions",
                id, campaign.contribution_count
            )));
        }

        tables.campaigns.remove(id);
        tables.milestones.remove(id);
        tables.updates.remove(id);
        Ok(())
    }

    async fn list_milestones(&self, id: &CampaignId) -> LedgerResult<Vec<Milestone>> {
        self.check_fault()?;
        Ok(self
            .tables
            .read()
            .await
            .milestones
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    // ==================== Contributions ====================

    async fn record_contribution(&self, draft: &ContributionDraft) -> LedgerResult<FundingReceipt> {
        self.check_fault()?;
        let now = Utc::now();
        let mut tables = self.tables.write().await;

        if tables.event_index.contains_key(&draft.event_id) {
            return Err(LedgerError::DuplicateEvent(draft.event_id.to_string()));
        }
        let mut campaign = tables
            .campaigns
            .get(&draft.campaign_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("campaign {}", draft.campaign_id)))?;
        let mut milestones = tables
            .milestones
            .get(&draft.campaign_id)
            .cloned()
            .unwrap_or_default();

        // work on copies; tables change only after every step succeeded
        let outcome = apply_contribution(&mut campaign, &mut milestones, draft.amount, now)?;
        let contribution = draft.clone().into_contribution(ContributionId::generate(), now);
        let reached_milestones = outcome
            .reached
            .iter()
            .map(|&i| milestones[i].clone())
            .collect();

        tables
            .event_index
            .insert(contribution.event_id.clone(), contribution.id.clone());
        tables
            .contributions
            .insert(contribution.id.clone(), contribution.clone());
        tables.campaigns.insert(campaign.id.clone(), campaign.clone());
        tables.milestones.insert(campaign.id.clone(), milestones);

        Ok(FundingReceipt {
            contribution,
            campaign,
            reached_milestones,
            became_fulfilled: outcome.became_fulfilled,
        })
    }

    async fn get_contribution_by_event(
        &self,
        event_id: &EventId,
    ) -> LedgerResult<Option<Contribution>> {
        self.check_fault()?;
        let tables = self.tables.read().await;
        Ok(tables
            .event_index
            .get(event_id)
            .and_then(|id| tables.contributions.get(id))
            .cloned())
    }

    async fn list_contributions(
        &self,
        filter: &ContributionFilter,
    ) -> LedgerResult<Vec<Contribution>> {
        self.check_fault()?;
        let tables = self.tables.read().await;
        let mut contributions: Vec<Contribution> = tables
            .contributions
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        sort_contributions_newest_first(&mut contributions);
        Ok(contributions)
    }

    // ==================== Campaign updates ====================

    async fn insert_update(&self, update: &CampaignUpdate) -> LedgerResult<()> {
        self.check_fault()?;
        let mut tables = self.tables.write().await;
        if !tables.campaigns.contains_key(&update.campaign_id) {
            return Err(LedgerError::NotFound(format!(
                "campaign {}",
                update.campaign_id
            )));
        }
        tables
            .updates
            .entry(update.campaign_id.clone())
            .or_default()
            .push(update.clone());
        Ok(())
    }

    async fn list_updates(&self, id: &CampaignId) -> LedgerResult<Vec<CampaignUpdate>> {
        self.check_fault()?;
        let mut updates = self
            .tables
            .read()
            .await
            .updates
            .get(id)
            .cloned()
            .unwrap_or_default();
        sort_updates_newest_first(&mut updates);
        Ok(updates)
    }

    // ==================== Lifecycle ====================

    async fn ping(&self) -> LedgerResult<()> {
        self.check_fault()
    }

    async fn flush(&self) -> LedgerResult<()> {
        Ok(())
    }
}
