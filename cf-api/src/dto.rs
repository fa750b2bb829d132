//! Data Transfer Objects for API requests and responses
//!
//! JSON is camelCase. Amounts are strings of base-10 digits; requests also
//! accept plain JSON integers for amount fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use cf_core::{
    Campaign, CampaignDetail, CampaignUpdate, Contribution, FundingReceipt, Milestone, User,
    UserProfile,
};
use cf_db::{CampaignInput, CampaignPatchInput, ContributionInput, MilestoneInput};

// ============ Field helpers ============

/// Amount given as `"123"` or `123`
fn amount_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn nullable_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

// ============ User DTOs ============

/// Wallet connect request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub wallet_address: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddressQuery {
    pub wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub wallet_address: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            wallet_address: user.wallet_address.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope<T> {
    pub user: T,
}

#[derive(Debug, Serialize)]
pub struct ProfileCounts {
    pub campaigns: u64,
    pub transactions: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub campaigns: Vec<CampaignResponse>,
    #[serde(rename = "_count")]
    pub count: ProfileCounts,
}

impl From<&UserProfile> for ProfileResponse {
    fn from(profile: &UserProfile) -> Self {
        Self {
            user: UserResponse::from(&profile.user),
            campaigns: profile.campaigns.iter().map(CampaignResponse::from).collect(),
            count: ProfileCounts {
                campaigns: profile.campaign_count,
                transactions: profile.contribution_count,
            },
        }
    }
}

// ============ Campaign DTOs ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "amount_field")]
    pub target_amount: Option<String>,
}

/// Create campaign request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub creator_wallet: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "amount_field")]
    pub goal_amount: Option<String>,
    pub email: Option<String>,
    pub deadline: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub milestones: Vec<MilestoneRequest>,
}

impl From<CreateCampaignRequest> for CampaignInput {
    fn from(req: CreateCampaignRequest) -> Self {
        Self {
            creator_wallet: req.creator_wallet,
            title: req.title,
            description: req.description,
            goal_amount: req.goal_amount,
            email: req.email,
            deadline: req.deadline,
            category: req.category,
            image_url: req.image_url,
            milestones: req
                .milestones
                .into_iter()
                .map(|m| MilestoneInput {
                    title: m.title,
                    description: m.description,
                    target_amount: m.target_amount,
                })
                .collect(),
        }
    }
}

/// Owner edit request
///
/// The aggregate fields are listed so a request carrying them can be
/// rejected instead of silently ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    pub requester_wallet: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub deadline: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub goal_amount: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub current_amount: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub contribution_count: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub fulfilled_at: Option<Option<serde_json::Value>>,
}

impl UpdateCampaignRequest {
    /// Names of read-only fields present in the request, `null` included
    pub fn read_only_fields(&self) -> Vec<&'static str> {
        [
            ("goalAmount", self.goal_amount.is_some()),
            ("currentAmount", self.current_amount.is_some()),
            ("contributionCount", self.contribution_count.is_some()),
            ("fulfilledAt", self.fulfilled_at.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    pub fn to_patch_input(&self) -> CampaignPatchInput {
        CampaignPatchInput {
            title: self.title.clone(),
            description: self.description.clone(),
            email: self.email.clone(),
            category: self.category.clone(),
            image_url: self.image_url.clone(),
            deadline: self.deadline.clone(),
            status: self.status.clone(),
        }
    }
}

/// Body of close/delete requests
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterRequest {
    pub requester_wallet: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignListQuery {
    pub status: Option<String>,
    pub creator_wallet: Option<String>,
    pub exclude_fulfilled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CampaignCounts {
    pub transactions: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    pub id: String,
    pub creator_wallet: String,
    pub title: String,
    pub description: String,
    pub goal_amount: String,
    pub current_amount: String,
    pub progress_percent: String,
    pub status: String,
    pub email: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub deadline_passed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
    #[serde(rename = "_count")]
    pub count: CampaignCounts,
}

impl From<&Campaign> for CampaignResponse {
    fn from(campaign: &Campaign) -> Self {
        Self {
            id: campaign.id.to_string(),
            creator_wallet: campaign.creator_wallet.to_string(),
            title: campaign.title.clone(),
            description: campaign.description.clone(),
            goal_amount: campaign.goal_amount.to_string(),
            current_amount: campaign.current_amount.to_string(),
            progress_percent: campaign.progress_percent().to_string(),
            status: campaign.status.to_string(),
            email: campaign.email.clone(),
            category: campaign.category.clone(),
            image_url: campaign.image_url.clone(),
            deadline: campaign.deadline,
            deadline_passed: campaign.is_deadline_passed(Utc::now()),
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
            fulfilled_at: campaign.fulfilled_at,
            count: CampaignCounts {
                transactions: campaign.contribution_count,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneResponse {
    pub id: String,
    pub campaign_id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: String,
    pub order: u32,
    pub is_reached: bool,
    pub reached_at: Option<DateTime<Utc>>,
}

impl From<&Milestone> for MilestoneResponse {
    fn from(m: &Milestone) -> Self {
        Self {
            id: m.id.to_string(),
            campaign_id: m.campaign_id.to_string(),
            title: m.title.clone(),
            description: m.description.clone(),
            target_amount: m.target_amount.to_string(),
            order: m.order,
            is_reached: m.is_reached,
            reached_at: m.reached_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdateResponse {
    pub id: String,
    pub campaign_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&CampaignUpdate> for CampaignUpdateResponse {
    fn from(u: &CampaignUpdate) -> Self {
        Self {
            id: u.id.to_string(),
            campaign_id: u.campaign_id.to_string(),
            title: u.title.clone(),
            content: u.content.clone(),
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetailResponse {
    #[serde(flatten)]
    pub campaign: CampaignResponse,
    pub creator: Option<UserResponse>,
    pub transactions: Vec<ContributionResponse>,
    pub milestones: Vec<MilestoneResponse>,
    pub updates: Vec<CampaignUpdateResponse>,
}

impl From<&CampaignDetail> for CampaignDetailResponse {
    fn from(detail: &CampaignDetail) -> Self {
        Self {
            campaign: CampaignResponse::from(&detail.campaign),
            creator: detail.creator.as_ref().map(UserResponse::from),
            transactions: detail
                .contributions
                .iter()
                .map(ContributionResponse::from)
                .collect(),
            milestones: detail.milestones.iter().map(MilestoneResponse::from).collect(),
            updates: detail
                .updates
                .iter()
                .map(CampaignUpdateResponse::from)
                .collect(),
        }
    }
}

/// Campaign with its milestones, returned on create
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCampaignResponse {
    #[serde(flatten)]
    pub campaign: CampaignResponse,
    pub milestones: Vec<MilestoneResponse>,
}

#[derive(Debug, Serialize)]
pub struct CampaignEnvelope<T> {
    pub campaign: T,
}

#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub campaigns: Vec<CampaignResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateEnvelope {
    pub update: CampaignUpdateResponse,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ============ Transaction DTOs ============

/// Record contribution request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordContributionRequest {
    pub campaign_id: Option<String>,
    pub donor_wallet: Option<String>,
    #[serde(default, deserialize_with = "amount_field")]
    pub amount: Option<String>,
    pub transaction_hash: Option<String>,
    pub block_number: Option<u64>,
    pub is_anonymous: Option<bool>,
}

impl From<RecordContributionRequest> for ContributionInput {
    fn from(req: RecordContributionRequest) -> Self {
        Self {
            campaign_id: req.campaign_id,
            donor_wallet: req.donor_wallet,
            amount: req.amount,
            event_id: req.transaction_hash,
            block_number: req.block_number,
            is_anonymous: req.is_anonymous,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionListQuery {
    pub campaign_id: Option<String>,
    pub donor_wallet: Option<String>,
}

/// Recorded contribution. The donor is withheld for anonymous ones.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionResponse {
    pub id: String,
    pub campaign_id: String,
    pub donor_wallet: Option<String>,
    pub amount: String,
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Contribution> for ContributionResponse {
    fn from(c: &Contribution) -> Self {
        Self {
            id: c.id.to_string(),
            campaign_id: c.campaign_id.to_string(),
            donor_wallet: (!c.is_anonymous).then(|| c.donor_wallet.to_string()),
            amount: c.amount.to_string(),
            transaction_hash: c.event_id.to_string(),
            block_number: c.block_number,
            is_anonymous: c.is_anonymous,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordContributionResponse {
    pub transaction: ContributionResponse,
    pub campaign: CampaignResponse,
    /// Milestones reached by this contribution, ascending order
    pub reached_milestones: Vec<MilestoneResponse>,
}

impl From<&FundingReceipt> for RecordContributionResponse {
    fn from(receipt: &FundingReceipt) -> Self {
        Self {
            transaction: ContributionResponse::from(&receipt.contribution),
            campaign: CampaignResponse::from(&receipt.campaign),
            reached_milestones: receipt
                .reached_milestones
                .iter()
                .map(MilestoneResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContributionListResponse {
    pub transactions: Vec<ContributionResponse>,
}

// ============ Achievement DTOs ============

#[derive(Debug, Deserialize)]
pub struct AchievementQuery {
    pub wallet: Option<String>,
}

// ============ Health DTOs ============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_accepts_string_or_number() {
        let req: RecordContributionRequest = serde_json::from_value(json!({
            "campaignId": "c1",
            "donorWallet": "0xbob",
            "amount": 600,
            "transactionHash": "0xabc"
        }))
        .unwrap();
        assert_eq!(req.amount.as_deref(), Some("600"));

        let req: RecordContributionRequest =
            serde_json::from_value(json!({ "amount": "340282366920938463463374607431768211455" }))
                .unwrap();
        assert_eq!(req.amount.as_deref(), Some("340282366920938463463374607431768211455"));

        let req: RecordContributionRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.amount, None);
    }

    #[test]
    fn test_nullable_fields() {
        let req: UpdateCampaignRequest = serde_json::from_value(json!({
            "category": null,
            "imageUrl": "https://example.com/a.png"
        }))
        .unwrap();
        assert_eq!(req.category, Some(None));
        assert_eq!(req.image_url, Some(Some("https://example.com/a.png".to_string())));
        assert_eq!(req.deadline, None);
        assert!(req.read_only_fields().is_empty());

        let req: UpdateCampaignRequest =
            serde_json::from_value(json!({ "currentAmount": "5", "goalAmount": 1 })).unwrap();
        assert_eq!(req.read_only_fields(), vec!["goalAmount", "currentAmount"]);
    }

    #[test]
    fn test_read_only_fields_detected_when_null() {
        let req: UpdateCampaignRequest = serde_json::from_value(json!({
            "title": "y",
            "goalAmount": null,
            "contributionCount": 99,
            "fulfilledAt": null
        }))
        .unwrap();
        assert_eq!(
            req.read_only_fields(),
            vec!["goalAmount", "contributionCount", "fulfilledAt"]
        );
    }
}
