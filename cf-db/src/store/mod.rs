//! Ledger storage
//!
//! [`LedgerStore`] is the only way services touch persisted state. Each
//! method is one unit of work: it either applies every write it makes or
//! none of them. `record_contribution` runs the recorder, the aggregator
//! and the milestone evaluator in a single serializable transaction.
//!
//! Implementations:
//! - [`MemoryLedgerStore`]: one lock over all tables, for tests and demos
//! - [`SledLedgerStore`]: embedded sled database, multi-tree transactions

pub mod memory;
pub mod sled;

pub use self::memory::MemoryLedgerStore;
pub use self::sled::SledLedgerStore;

use async_trait::async_trait;
use std::sync::Arc;

use cf_core::{
    Campaign, CampaignFilter, CampaignId, CampaignPatch, CampaignUpdate, Contribution,
    ContributionDraft, ContributionFilter, EventId, FundingReceipt, LedgerResult, Milestone,
    ProfileUpdate, User, WalletAddress,
};

use crate::config::{StoreBackend, StoreConfig};
use crate::error::DbResult;

/// Funding ledger storage interface
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ==================== Users ====================

    async fn get_user(&self, wallet: &WalletAddress) -> LedgerResult<Option<User>>;

    /// Create the user or apply the provided profile fields
    async fn upsert_user(&self, wallet: &WalletAddress, profile: &ProfileUpdate)
        -> LedgerResult<User>;

    // ==================== Campaigns ====================

    /// Insert a new campaign with its milestones
    async fn insert_campaign(&self, campaign: &Campaign, milestones: &[Milestone])
        -> LedgerResult<()>;

    async fn get_campaign(&self, id: &CampaignId) -> LedgerResult<Option<Campaign>>;

    /// Campaigns matching `filter`, newest first
    async fn list_campaigns(&self, filter: &CampaignFilter) -> LedgerResult<Vec<Campaign>>;

    /// Check ownership and apply `patch` in one unit of work
    async fn update_campaign(
        &self,
        id: &CampaignId,
        requester: Option<&WalletAddress>,
        patch: &CampaignPatch,
    ) -> LedgerResult<Campaign>;

    /// Delete a campaign with its milestones and updates.
    ///
    /// Fails with `Conflict` when contributions were recorded against it.
    async fn delete_campaign(&self, id: &CampaignId, requester: Option<&WalletAddress>)
        -> LedgerResult<()>;

    /// Milestones of a campaign in ascending order index
    async fn list_milestones(&self, id: &CampaignId) -> LedgerResult<Vec<Milestone>>;

    // ==================== Contributions ====================

    /// Record one contribution and apply it to the campaign and milestones.
    ///
    /// Fails with `DuplicateEvent` if the event id is already recorded and
    /// `NotFound` if the campaign does not exist; in both cases nothing is
    /// written.
    async fn record_contribution(&self, draft: &ContributionDraft) -> LedgerResult<FundingReceipt>;

    async fn get_contribution_by_event(&self, event_id: &EventId)
        -> LedgerResult<Option<Contribution>>;

    /// Contributions matching `filter`, newest first
    async fn list_contributions(&self, filter: &ContributionFilter)
        -> LedgerResult<Vec<Contribution>>;

    // ==================== Campaign updates ====================

    /// Fails with `NotFound` if the campaign does not exist
    async fn insert_update(&self, update: &CampaignUpdate) -> LedgerResult<()>;

    /// Updates of a campaign, newest first
    async fn list_updates(&self, id: &CampaignId) -> LedgerResult<Vec<CampaignUpdate>>;

    // ==================== Lifecycle ====================

    /// Cheap round trip used by readiness probes
    async fn ping(&self) -> LedgerResult<()>;

    /// Persist buffered writes
    async fn flush(&self) -> LedgerResult<()>;
}

/// Open the store selected by `config`
pub fn open_store(config: &StoreConfig) -> DbResult<Arc<dyn LedgerStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryLedgerStore::new())),
        StoreBackend::Sled => Ok(Arc::new(SledLedgerStore::open(&config.data_dir)?)),
    }
}

pub(crate) fn sort_campaigns_newest_first(campaigns: &mut [Campaign]) {
    campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

pub(crate) fn sort_contributions_newest_first(contributions: &mut [Contribution]) {
    contributions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

pub(crate) fn sort_updates_newest_first(updates: &mut [CampaignUpdate]) {
    updates.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// Behaviour every store must share, run against each backend
#[cfg(test)]
pub(crate) mod conformance {
    use super::*;
    use cf_core::{
        Amount, CampaignDraft, CampaignStatus, LedgerError, MilestoneDraft,
    };
    use chrono::Utc;

    pub fn wallet(raw: &str) -> WalletAddress {
        WalletAddress::parse(raw, "wallet").unwrap()
    }

    pub async fn seed_campaign(
        store: &dyn LedgerStore,
        creator: &str,
        goal: u128,
        targets: &[u128],
    ) -> Campaign {
        let (campaign, milestones) = CampaignDraft {
            creator_wallet: wallet(creator),
            title: "Community garden".to_string(),
            description: "Raised beds for the block".to_string(),
            goal_amount: Amount(goal),
            email: "garden@example.com".to_string(),
            category: None,
            image_url: None,
            deadline: None,
            milestones: targets
                .iter()
                .enumerate()
                .map(|(i, t)| MilestoneDraft {
                    title: format!("Stage {}", i + 1),
                    description: None,
                    target_amount: Amount(*t),
                })
                .collect(),
        }
        .into_records(CampaignId::generate(), Utc::now());
        store.insert_campaign(&campaign, &milestones).await.unwrap();
        campaign
    }

    pub fn draft(campaign: &Campaign, donor: &str, amount: u128, event: &str) -> ContributionDraft {
        ContributionDraft {
            campaign_id: campaign.id.clone(),
            donor_wallet: wallet(donor),
            amount: Amount(amount),
            event_id: EventId::parse(event, "transactionHash").unwrap(),
            block_number: None,
            is_anonymous: false,
        }
    }

    pub async fn goal_crossing(store: &dyn LedgerStore) {
        let campaign = seed_campaign(store, "0xalice", 1000, &[]).await;

        let first = store
            .record_contribution(&draft(&campaign, "0xbob", 600, "0xe1"))
            .await
            .unwrap();
        assert_eq!(first.campaign.current_amount, Amount(600));
        assert_eq!(first.campaign.status, CampaignStatus::Active);
        assert!(!first.became_fulfilled);

        let second = store
            .record_contribution(&draft(&campaign, "0xcarol", 500, "0xe2"))
            .await
            .unwrap();
        assert_eq!(second.campaign.current_amount, Amount(1100));
        assert_eq!(second.campaign.status, CampaignStatus::Fulfilled);
        assert!(second.campaign.fulfilled_at.is_some());
        assert!(second.became_fulfilled);

        let stored = store.get_campaign(&campaign.id).await.unwrap().unwrap();
        assert_eq!(stored, second.campaign);
        assert_eq!(stored.contribution_count, 2);
    }

    pub async fn duplicate_event(store: &dyn LedgerStore) {
        let campaign = seed_campaign(store, "0xalice", 1000, &[]).await;
        store
            .record_contribution(&draft(&campaign, "0xbob", 600, "0xdup"))
            .await
            .unwrap();

        let err = store
            .record_contribution(&draft(&campaign, "0xcarol", 500, "0xdup"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateEvent(_)));

        let stored = store.get_campaign(&campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.current_amount, Amount(600));
        assert_eq!(stored.status, CampaignStatus::Active);

        let contributions = store
            .list_contributions(&ContributionFilter::for_campaign(&campaign.id))
            .await
            .unwrap();
        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].donor_wallet, wallet("0xbob"));
    }

    pub async fn milestones_reached_in_order(store: &dyn LedgerStore) {
        let campaign = seed_campaign(store, "0xalice", 2000, &[300, 900]).await;

        let receipt = store
            .record_contribution(&draft(&campaign, "0xbob", 950, "0xm1"))
            .await
            .unwrap();
        let orders: Vec<u32> = receipt.reached_milestones.iter().map(|m| m.order).collect();
        assert_eq!(orders, vec![0, 1]);

        let milestones = store.list_milestones(&campaign.id).await.unwrap();
        assert_eq!(milestones.len(), 2);
        assert!(milestones.iter().all(|m| m.is_reached && m.reached_at.is_some()));
        assert_eq!(milestones[0].target_amount, Amount(300));

        // reached milestones stay reached and are not reported again
        let again = store
            .record_contribution(&draft(&campaign, "0xbob", 10, "0xm2"))
            .await
            .unwrap();
        assert!(again.reached_milestones.is_empty());
        let after = store.list_milestones(&campaign.id).await.unwrap();
        assert_eq!(after[0].reached_at, milestones[0].reached_at);
    }

    pub async fn unknown_campaign(store: &dyn LedgerStore) {
        let ghost = seed_campaign(store, "0xalice", 100, &[]).await;
        store.delete_campaign(&ghost.id, None).await.unwrap();

        let err = store
            .record_contribution(&draft(&ghost, "0xbob", 50, "0xghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        assert!(store
            .get_contribution_by_event(&EventId::parse("0xghost", "e").unwrap())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .list_contributions(&ContributionFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    pub async fn users_upsert(store: &dyn LedgerStore) {
        let alice = wallet("0xAlice");
        let created = store
            .upsert_user(
                &alice,
                &ProfileUpdate {
                    email: Some("alice@example.com".to_string()),
                    username: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.wallet_address.as_str(), "0xalice");

        let updated = store
            .upsert_user(
                &alice,
                &ProfileUpdate {
                    email: None,
                    username: Some("alice".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("alice@example.com"));
        assert_eq!(updated.username.as_deref(), Some("alice"));
        assert_eq!(updated.created_at, created.created_at);

        assert_eq!(store.get_user(&alice).await.unwrap(), Some(updated));
        assert!(store.get_user(&wallet("0xnobody")).await.unwrap().is_none());
    }

    pub async fn campaign_edit_and_delete(store: &dyn LedgerStore) {
        let campaign = seed_campaign(store, "0xalice", 500, &[100]).await;
        let intruder = wallet("0xmallory");

        let err = store
            .update_campaign(
                &campaign.id,
                Some(&intruder),
                &CampaignPatch {
                    title: Some("mine now".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Forbidden(_)));

        let owner = wallet("0xalice");
        let updated = store
            .update_campaign(
                &campaign.id,
                Some(&owner),
                &CampaignPatch {
                    title: Some("Bigger garden".to_string()),
                    category: Some(Some("community".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Bigger garden");
        assert_eq!(updated.category.as_deref(), Some("community"));
        assert_eq!(updated.goal_amount, Amount(500));

        let update = CampaignUpdate::new(
            campaign.id.clone(),
            "Week 1".to_string(),
            "Soil delivered".to_string(),
            Utc::now(),
        );
        store.insert_update(&update).await.unwrap();
        assert_eq!(store.list_updates(&campaign.id).await.unwrap(), vec![update]);

        let err = store.delete_campaign(&campaign.id, Some(&intruder)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Forbidden(_)));

        store.delete_campaign(&campaign.id, Some(&owner)).await.unwrap();
        assert!(store.get_campaign(&campaign.id).await.unwrap().is_none());
        assert!(store.list_milestones(&campaign.id).await.unwrap().is_empty());
        assert!(store.list_updates(&campaign.id).await.unwrap().is_empty());

        let err = store.delete_campaign(&campaign.id, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    pub async fn delete_with_contributions_conflicts(store: &dyn LedgerStore) {
        let campaign = seed_campaign(store, "0xalice", 500, &[]).await;
        store
            .record_contribution(&draft(&campaign, "0xbob", 10, "0xkeep"))
            .await
            .unwrap();

        let err = store.delete_campaign(&campaign.id, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
        assert!(store.get_campaign(&campaign.id).await.unwrap().is_some());
    }

    pub async fn insert_update_requires_campaign(store: &dyn LedgerStore) {
        let update = CampaignUpdate::new(
            CampaignId::new("missing"),
            "t".to_string(),
            "c".to_string(),
            Utc::now(),
        );
        let err = store.insert_update(&update).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    pub async fn listing_filters(store: &dyn LedgerStore) {
        let older = seed_campaign(store, "0xalice", 100, &[]).await;
        let newer = seed_campaign(store, "0xbob", 100, &[]).await;
        store
            .record_contribution(&draft(&older, "0xcarol", 100, "0xfill"))
            .await
            .unwrap();

        let all = store.list_campaigns(&CampaignFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at >= all[1].created_at);

        let open = store
            .list_campaigns(&CampaignFilter {
                exclude_fulfilled: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(open.iter().map(|c| &c.id).collect::<Vec<_>>(), vec![&newer.id]);

        let mine = store
            .list_campaigns(&CampaignFilter {
                creator_wallet: Some(wallet("0xALICE")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, older.id);

        let by_donor = store
            .list_contributions(&ContributionFilter::for_donor(&wallet("0xcarol")))
            .await
            .unwrap();
        assert_eq!(by_donor.len(), 1);
        assert_eq!(by_donor[0].campaign_id, older.id);
    }
}
