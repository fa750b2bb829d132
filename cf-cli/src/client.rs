//! API Client
//!
//! HTTP client for the crowdfunding API.

use crate::error::{CliError, CliResult};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Crowdfunding API client
pub struct CfClient {
    client: Client,
    base_url: String,
}

impl CfClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>) -> CliResult<Self> {
        Self::with_timeout(base_url, 30)
    }

    /// Create with custom timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CliError::connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn api_url(&self, path: &str) -> String {
        self.url(&format!("/api/v1{}", path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> CliResult<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                CliError::connection(format!("{} ({})", self.base_url, e))
            } else {
                CliError::from(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(CliError::api(status.as_u16(), message))
    }

    /// Liveness of the server
    pub async fn health(&self) -> CliResult<HealthResponse> {
        self.send(self.client.get(self.url("/health"))).await
    }

    /// Readiness (store ping)
    pub async fn ready(&self) -> CliResult<HealthResponse> {
        self.send(self.client.get(self.url("/ready"))).await
    }

    pub async fn create_campaign(&self, request: &CreateCampaignRequest) -> CliResult<CampaignDetail> {
        let envelope: CampaignEnvelope<CampaignDetail> = self
            .send(self.client.post(self.api_url("/campaigns")).json(request))
            .await?;
        Ok(envelope.campaign)
    }

    pub async fn list_campaigns(
        &self,
        status: Option<&str>,
        creator: Option<&str>,
        exclude_fulfilled: bool,
    ) -> CliResult<Vec<CampaignSummary>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        if let Some(creator) = creator {
            query.push(("creatorWallet", creator.to_string()));
        }
        if exclude_fulfilled {
            query.push(("excludeFulfilled", "true".to_string()));
        }

        let list: CampaignList = self
            .send(self.client.get(self.api_url("/campaigns")).query(&query))
            .await?;
        Ok(list.campaigns)
    }

    pub async fn get_campaign(&self, id: &str) -> CliResult<CampaignDetail> {
        let envelope: CampaignEnvelope<CampaignDetail> = self
            .send(self.client.get(self.api_url(&format!("/campaigns/{}", id))))
            .await?;
        Ok(envelope.campaign)
    }

    pub async fn close_campaign(&self, id: &str, requester: Option<&str>) -> CliResult<CampaignSummary> {
        let envelope: CampaignEnvelope<CampaignSummary> = self
            .send(
                self.client
                    .post(self.api_url(&format!("/campaigns/{}/close", id)))
                    .json(&RequesterRequest {
                        requester_wallet: requester.map(str::to_string),
                    }),
            )
            .await?;
        Ok(envelope.campaign)
    }

    pub async fn post_update(&self, id: &str, title: &str, content: &str) -> CliResult<UpdateSummary> {
        let envelope: UpdateEnvelope = self
            .send(
                self.client
                    .post(self.api_url(&format!("/campaigns/{}/updates", id)))
                    .json(&serde_json::json!({ "title": title, "content": content })),
            )
            .await?;
        Ok(envelope.update)
    }

    pub async fn record_contribution(&self, request: &RecordContributionRequest) -> CliResult<RecordResult> {
        self.send(self.client.post(self.api_url("/transactions")).json(request))
            .await
    }

    pub async fn list_contributions(
        &self,
        campaign: Option<&str>,
        donor: Option<&str>,
    ) -> CliResult<Vec<ContributionSummary>> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(campaign) = campaign {
            query.push(("campaignId", campaign));
        }
        if let Some(donor) = donor {
            query.push(("donorWallet", donor));
        }

        let list: ContributionList = self
            .send(self.client.get(self.api_url("/transactions")).query(&query))
            .await?;
        Ok(list.transactions)
    }

    pub async fn connect(
        &self,
        wallet: &str,
        email: Option<&str>,
        username: Option<&str>,
    ) -> CliResult<UserSummary> {
        let envelope: UserEnvelope<UserSummary> = self
            .send(self.client.post(self.api_url("/auth")).json(&serde_json::json!({
                "walletAddress": wallet,
                "email": email,
                "username": username,
            })))
            .await?;
        Ok(envelope.user)
    }

    pub async fn profile(&self, wallet: &str) -> CliResult<UserProfile> {
        let envelope: UserEnvelope<UserProfile> = self
            .send(
                self.client
                    .get(self.api_url("/auth"))
                    .query(&[("walletAddress", wallet)]),
            )
            .await?;
        Ok(envelope.user)
    }

    pub async fn achievements(&self, wallet: &str) -> CliResult<Vec<CampaignSummary>> {
        let list: CampaignList = self
            .send(
                self.client
                    .get(self.api_url("/achievements/user"))
                    .query(&[("wallet", wallet)]),
            )
            .await?;
        Ok(list.campaigns)
    }
}

// ============ Request Types ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRequest {
    pub title: String,
    pub target_amount: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub creator_wallet: String,
    pub title: String,
    pub description: String,
    pub goal_amount: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub milestones: Vec<MilestoneRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordContributionRequest {
    pub campaign_id: String,
    pub donor_wallet: String,
    pub amount: String,
    pub transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    pub is_anonymous: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequesterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    requester_wallet: Option<String>,
}

// ============ Response Types ============

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub id: String,
    pub creator_wallet: String,
    pub title: String,
    pub goal_amount: String,
    pub current_amount: String,
    pub progress_percent: String,
    pub status: String,
    pub fulfilled_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSummary {
    pub title: String,
    pub target_amount: String,
    pub order: u32,
    pub is_reached: bool,
    pub reached_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSummary {
    pub id: String,
    pub campaign_id: String,
    pub donor_wallet: Option<String>,
    pub amount: String,
    pub transaction_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

/// Campaign with nested records. Lists absent from a response stay empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: CampaignSummary,
    #[serde(default)]
    pub milestones: Vec<MilestoneSummary>,
    #[serde(default)]
    pub transactions: Vec<ContributionSummary>,
    #[serde(default)]
    pub updates: Vec<UpdateSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResult {
    pub transaction: ContributionSummary,
    pub campaign: CampaignSummary,
    pub reached_milestones: Vec<MilestoneSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub wallet_address: String,
    pub email: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCounts {
    pub campaigns: u64,
    pub transactions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserSummary,
    pub campaigns: Vec<CampaignSummary>,
    #[serde(rename = "_count")]
    pub count: ProfileCounts,
}

#[derive(Debug, Deserialize)]
struct CampaignEnvelope<T> {
    campaign: T,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope<T> {
    user: T,
}

#[derive(Debug, Deserialize)]
struct UpdateEnvelope {
    update: UpdateSummary,
}

#[derive(Debug, Deserialize)]
struct CampaignList {
    campaigns: Vec<CampaignSummary>,
}

#[derive(Debug, Deserialize)]
struct ContributionList {
    transactions: Vec<ContributionSummary>,
}
