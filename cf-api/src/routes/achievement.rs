//! Achievement endpoints

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::dto::{AchievementQuery, CampaignListResponse, CampaignResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Fulfilled campaigns created by a wallet
pub async fn user_achievements(
    State(state): State<AppState>,
    query: Result<Query<AchievementQuery>, QueryRejection>,
) -> ApiResult<Json<CampaignListResponse>> {
    let Query(query) = query?;

    let campaigns = state
        .achievements()
        .for_creator(query.wallet.as_deref())
        .await?;

    Ok(Json(CampaignListResponse {
        campaigns: campaigns.iter().map(CampaignResponse::from).collect(),
    }))
}
