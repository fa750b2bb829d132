//! Sled-backed store
//!
//! Tree layout:
//!
//! | tree | key | value |
//! |------|-----|-------|
//! | `users` | wallet | `User` |
//! | `campaigns` | campaign id | `CampaignRow` |
//! | `milestones` | `{campaign id}/{order:010}` | `Milestone` |
//! | `contributions` | contribution id | `Contribution` |
//! | `event_index` | event id | contribution id |
//! | `updates` | `{campaign id}/{seq:020}` | `CampaignUpdate` |
//!
//! Transactional trees cannot be scanned, so a campaign row carries the
//! order indices of its milestones and the next update sequence number.
//! Every multi-record write is a sled transaction across the trees it
//! touches, which sled runs with serializable isolation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sled::transaction::{
    abort, ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
    Transactional, TransactionalTree,
};
use std::path::Path;
use tracing::debug;

use cf_core::{
    apply_contribution, Campaign, CampaignFilter, CampaignId, CampaignPatch, CampaignUpdate,
    Contribution, ContributionDraft, ContributionFilter, ContributionId, EventId, FundingReceipt,
    LedgerError, LedgerResult, Milestone, ProfileUpdate, User, WalletAddress,
};

use super::{
    sort_campaigns_newest_first, sort_contributions_newest_first, sort_updates_newest_first,
    LedgerStore,
};
use crate::error::{DbError, DbResult};

const USERS_TREE: &str = "users";
const CAMPAIGNS_TREE: &str = "campaigns";
const MILESTONES_TREE: &str = "milestones";
const CONTRIBUTIONS_TREE: &str = "contributions";
const EVENT_INDEX_TREE: &str = "event_index";
const UPDATES_TREE: &str = "updates";

/// Stored campaign record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CampaignRow {
    campaign: Campaign,
    milestone_orders: Vec<u32>,
    next_update_seq: u64,
}

type TxResult<T> = ConflictableTransactionResult<T, LedgerError>;

/// Sled ledger store
#[derive(Debug, Clone)]
pub struct SledLedgerStore {
    db: sled::Db,
    users: sled::Tree,
    campaigns: sled::Tree,
    milestones: sled::Tree,
    contributions: sled::Tree,
    event_index: sled::Tree,
    updates: sled::Tree,
}

impl SledLedgerStore {
    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Ok(Self {
            users: db.open_tree(USERS_TREE)?,
            campaigns: db.open_tree(CAMPAIGNS_TREE)?,
            milestones: db.open_tree(MILESTONES_TREE)?,
            contributions: db.open_tree(CONTRIBUTIONS_TREE)?,
            event_index: db.open_tree(EVENT_INDEX_TREE)?,
            updates: db.open_tree(UPDATES_TREE)?,
            db,
        })
    }

    /// Open a throwaway database that is removed when dropped
    pub fn temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self {
            users: db.open_tree(USERS_TREE)?,
            campaigns: db.open_tree(CAMPAIGNS_TREE)?,
            milestones: db.open_tree(MILESTONES_TREE)?,
            contributions: db.open_tree(CONTRIBUTIONS_TREE)?,
            event_index: db.open_tree(EVENT_INDEX_TREE)?,
            updates: db.open_tree(UPDATES_TREE)?,
            db,
        })
    }

    // ==================== Helpers ====================

    fn encode<T: Serialize>(value: &T) -> DbResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(tree: &'static str, bytes: &[u8]) -> DbResult<T> {
        serde_json::from_slice(bytes).map_err(|e| DbError::Corrupted {
            tree,
            reason: e.to_string(),
        })
    }

    fn milestone_key(campaign_id: &CampaignId, order: u32) -> String {
        format!("{}/{:010}", campaign_id, order)
    }

    fn update_key(campaign_id: &CampaignId, seq: u64) -> String {
        format!("{}/{:020}", campaign_id, seq)
    }

    fn child_prefix(campaign_id: &CampaignId) -> String {
        format!("{}/", campaign_id)
    }

    fn get_row(&self, id: &CampaignId) -> DbResult<Option<CampaignRow>> {
        match self.campaigns.get(id.as_str())? {
            Some(bytes) => Ok(Some(Self::decode(CAMPAIGNS_TREE, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Decode every record under a campaign's key prefix
    fn scan_children<T: DeserializeOwned>(
        tree: &sled::Tree,
        name: &'static str,
        campaign_id: &CampaignId,
    ) -> DbResult<Vec<T>> {
        tree.scan_prefix(Self::child_prefix(campaign_id))
            .values()
            .map(|item| Self::decode(name, &item?))
            .collect()
    }

    // ==================== Transaction helpers ====================

    fn tx_encode<T: Serialize>(value: &T) -> TxResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| ConflictableTransactionError::Abort(e.into()))
    }

    fn tx_decode<T: DeserializeOwned>(tree: &'static str, bytes: &[u8]) -> TxResult<T> {
        Self::decode(tree, bytes).map_err(|e| ConflictableTransactionError::Abort(e.into()))
    }

    fn tx_get_row(campaigns: &TransactionalTree, id: &CampaignId) -> TxResult<CampaignRow> {
        match campaigns.get(id.as_str())? {
            Some(bytes) => Self::tx_decode(CAMPAIGNS_TREE, &bytes),
            None => abort(LedgerError::NotFound(format!("campaign {}", id))),
        }
    }

    fn tx_put_row(campaigns: &TransactionalTree, row: &CampaignRow) -> TxResult<()> {
        campaigns.insert(row.campaign.id.as_str(), Self::tx_encode(row)?)?;
        Ok(())
    }

    fn finish<T>(result: Result<T, TransactionError<LedgerError>>) -> LedgerResult<T> {
        result.map_err(|e| match e {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => DbError::Sled(e).into(),
        })
    }

    fn record_in_tx(
        &self,
        draft: &ContributionDraft,
        now: DateTime<Utc>,
    ) -> Result<FundingReceipt, TransactionError<LedgerError>> {
        (
            &self.campaigns,
            &self.milestones,
            &self.contributions,
            &self.event_index,
        )
            .transaction(|(campaigns, milestones, contributions, event_index)| -> TxResult<FundingReceipt> {
                // Recorder: at most one contribution per event id
                if event_index.get(draft.event_id.as_str())?.is_some() {
                    return abort(LedgerError::DuplicateEvent(draft.event_id.to_string()));
                }
                let mut row = Self::tx_get_row(campaigns, &draft.campaign_id)?;

                let mut loaded = Vec::with_capacity(row.milestone_orders.len());
                for &order in &row.milestone_orders {
                    let key = Self::milestone_key(&draft.campaign_id, order);
                    match milestones.get(key.as_str())? {
                        Some(bytes) => loaded.push(Self::tx_decode::<Milestone>(
                            MILESTONES_TREE,
                            &bytes,
                        )?),
                        None => {
                            return abort(LedgerError::Fatal(format!(
                                "campaign {} lists missing milestone {}",
                                draft.campaign_id, order
                            )))
                        }
                    }
                }

                // Aggregator and milestone evaluator
                let outcome =
                    match apply_contribution(&mut row.campaign, &mut loaded, draft.amount, now) {
                        Ok(outcome) => outcome,
                        Err(e) => return abort(e),
                    };

                let contribution = draft
                    .clone()
                    .into_contribution(ContributionId::generate(), now);
                contributions.insert(contribution.id.as_str(), Self::tx_encode(&contribution)?)?;
                event_index.insert(contribution.event_id.as_str(), contribution.id.as_str())?;
                Self::tx_put_row(campaigns, &row)?;

                let mut reached_milestones = Vec::with_capacity(outcome.reached.len());
                for &index in &outcome.reached {
                    let milestone = &loaded[index];
                    let key = Self::milestone_key(&milestone.campaign_id, milestone.order);
                    milestones.insert(key.as_str(), Self::tx_encode(milestone)?)?;
                    reached_milestones.push(milestone.clone());
                }

                Ok(FundingReceipt {
                    contribution,
                    campaign: row.campaign.clone(),
                    reached_milestones,
                    became_fulfilled: outcome.became_fulfilled,
                })
            })
    }
}

#[async_trait]
impl LedgerStore for SledLedgerStore {
    // ==================== Users ====================

    async fn get_user(&self, wallet: &WalletAddress) -> LedgerResult<Option<User>> {
        match self.users.get(wallet.as_str()).map_err(DbError::from)? {
            Some(bytes) => Ok(Some(Self::decode(USERS_TREE, &bytes)?)),
            None => Ok(None),
        }
    }

    async fn upsert_user(
        &self,
        wallet: &WalletAddress,
        profile: &ProfileUpdate,
    ) -> LedgerResult<User> {
        let now = Utc::now();
        let result = self.users.transaction(|users| -> TxResult<User> {
            let user = match users.get(wallet.as_str())? {
                Some(bytes) => {
                    let mut user: User = Self::tx_decode(USERS_TREE, &bytes)?;
                    if !user.apply(profile, now) {
                        return Ok(user);
                    }
                    user
                }
                None => User::new(wallet.clone(), profile, now),
            };
            users.insert(wallet.as_str(), Self::tx_encode(&user)?)?;
            Ok(user)
        });
        Self::finish(result)
    }

    // ==================== Campaigns ====================

    async fn insert_campaign(
        &self,
        campaign: &Campaign,
        milestones: &[Milestone],
    ) -> LedgerResult<()> {
        let result = (&self.campaigns, &self.milestones).transaction(|(campaigns, milestone_tree)| -> TxResult<()> {
            if campaigns.get(campaign.id.as_str())?.is_some() {
                return abort(LedgerError::Conflict(format!(
                    "campaign {} already exists",
                    campaign.id
                )));
            }

            let mut milestone_orders = Vec::with_capacity(milestones.len());
            for milestone in milestones {
                let key = Self::milestone_key(&campaign.id, milestone.order);
                milestone_tree.insert(key.as_str(), Self::tx_encode(milestone)?)?;
                milestone_orders.push(milestone.order);
            }
            milestone_orders.sort_unstable();
            milestone_orders.dedup();

            Self::tx_put_row(
                campaigns,
                &CampaignRow {
                    campaign: campaign.clone(),
                    milestone_orders,
                    next_update_seq: 0,
                },
            )
        });
        Self::finish(result)?;
        debug!(campaign_id = %campaign.id, milestones = milestones.len(), "Campaign stored");
        Ok(())
    }

    async fn get_campaign(&self, id: &CampaignId) -> LedgerResult<Option<Campaign>> {
        Ok(self.get_row(id)?.map(|row| row.campaign))
    }

    async fn list_campaigns(&self, filter: &CampaignFilter) -> LedgerResult<Vec<Campaign>> {
        let mut campaigns = Vec::new();
        for item in self.campaigns.iter().values() {
            let row: CampaignRow = Self::decode(CAMPAIGNS_TREE, &item.map_err(DbError::from)?)?;
            if filter.matches(&row.campaign) {
                campaigns.push(row.campaign);
            }
        }
        sort_campaigns_newest_first(&mut campaigns);
        Ok(campaigns)
    }

    async fn update_campaign(
        &self,
        id: &CampaignId,
        requester: Option<&WalletAddress>,
        patch: &CampaignPatch,
    ) -> LedgerResult<Campaign> {
        let now = Utc::now();
        let result = self.campaigns.transaction(|campaigns| -> TxResult<Campaign> {
            let mut row = Self::tx_get_row(campaigns, id)?;
            if let Err(e) = row.campaign.ensure_owner(requester) {
                return abort(e);
            }
            if let Err(e) = row.campaign.apply_patch(patch, now) {
                return abort(e);
            }
            Self::tx_put_row(campaigns, &row)?;
            Ok(row.campaign)
        });
        Self::finish(result)
    }

    async fn delete_campaign(
        &self,
        id: &CampaignId,
        requester: Option<&WalletAddress>,
    ) -> LedgerResult<()> {
        let result = (&self.campaigns, &self.milestones, &self.updates).transaction(
            |(campaigns, milestones, updates)| -> TxResult<()> {
                let row = Self::tx_get_row(campaigns, id)?;
                if let Err(e) = row.campaign.ensure_owner(requester) {
                    return abort(e);
                }
                if row.campaign.contribution_count > 0 {
                    return abort(LedgerError::Conflict(format!(
                        "campaign {} has {} recorded contributions",
                        id, row.campaign.contribution_count
                    )));
                }

                for &order in &row.milestone_orders {
                    milestones.remove(Self::milestone_key(id, order).as_str())?;
                }
                for seq in 0..row.next_update_seq {
                    updates.remove(Self::update_key(id, seq).as_str())?;
                }
                campaigns.remove(id.as_str())?;
                Ok(())
            },
        );
        Self::finish(result)
    }

    async fn list_milestones(&self, id: &CampaignId) -> LedgerResult<Vec<Milestone>> {
        let mut milestones: Vec<Milestone> =
            Self::scan_children(&self.milestones, MILESTONES_TREE, id)?;
        milestones.retain(|m| &m.campaign_id == id);
        milestones.sort_by_key(|m| m.order);
        Ok(milestones)
    }

    // ==================== Contributions ====================

    async fn record_contribution(&self, draft: &ContributionDraft) -> LedgerResult<FundingReceipt> {
        Self::finish(self.record_in_tx(draft, Utc::now()))
    }

    async fn get_contribution_by_event(
        &self,
        event_id: &EventId,
    ) -> LedgerResult<Option<Contribution>> {
        let id = match self.event_index.get(event_id.as_str()).map_err(DbError::from)? {
            Some(id) => id,
            None => return Ok(None),
        };
        match self.contributions.get(id).map_err(DbError::from)? {
            Some(bytes) => Ok(Some(Self::decode(CONTRIBUTIONS_TREE, &bytes)?)),
            None => Err(DbError::Corrupted {
                tree: EVENT_INDEX_TREE,
                reason: format!("event {} points at a missing contribution", event_id),
            }
            .into()),
        }
    }

    async fn list_contributions(
        &self,
        filter: &ContributionFilter,
    ) -> LedgerResult<Vec<Contribution>> {
        let mut contributions = Vec::new();
        for item in self.contributions.iter().values() {
            let contribution: Contribution =
                Self::decode(CONTRIBUTIONS_TREE, &item.map_err(DbError::from)?)?;
            if filter.matches(&contribution) {
                contributions.push(contribution);
            }
        }
        sort_contributions_newest_first(&mut contributions);
        Ok(contributions)
    }

    // ==================== Campaign updates ====================

    async fn insert_update(&self, update: &CampaignUpdate) -> LedgerResult<()> {
        let result = (&self.campaigns, &self.updates).transaction(|(campaigns, updates)| -> TxResult<()> {
            let mut row = Self::tx_get_row(campaigns, &update.campaign_id)?;
            let key = Self::update_key(&update.campaign_id, row.next_update_seq);
            updates.insert(key.as_str(), Self::tx_encode(update)?)?;
            row.next_update_seq += 1;
            Self::tx_put_row(campaigns, &row)
        });
        Self::finish(result)
    }

    async fn list_updates(&self, id: &CampaignId) -> LedgerResult<Vec<CampaignUpdate>> {
        let mut updates: Vec<CampaignUpdate> =
            Self::scan_children(&self.updates, UPDATES_TREE, id)?;
        updates.retain(|u| &u.campaign_id == id);
        sort_updates_newest_first(&mut updates);
        Ok(updates)
    }

    // ==================== Lifecycle ====================

    async fn ping(&self) -> LedgerResult<()> {
        self.db.size_on_disk().map_err(DbError::from)?;
        Ok(())
    }

    async fn flush(&self) -> LedgerResult<()> {
        let bytes = self.db.flush_async().await.map_err(DbError::from)?;
        debug!(bytes, "Ledger store flushed");
        Ok(())
    }
}
