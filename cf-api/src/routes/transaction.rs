//! Contribution endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::dto::{
    ContributionListQuery, ContributionListResponse, ContributionResponse,
    RecordContributionRequest, RecordContributionResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Record a contribution and apply it to the campaign and its milestones
pub async fn record_contribution(
    State(state): State<AppState>,
    payload: Result<Json<RecordContributionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordContributionResponse>)> {
    let Json(req) = payload?;

    let receipt = state.funding().record(&req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordContributionResponse::from(&receipt)),
    ))
}

/// List contributions by campaign and/or donor, newest first
pub async fn list_contributions(
    State(state): State<AppState>,
    query: Result<Query<ContributionListQuery>, QueryRejection>,
) -> ApiResult<Json<ContributionListResponse>> {
    let Query(query) = query?;

    let contributions = state
        .funding()
        .list(query.campaign_id.as_deref(), query.donor_wallet.as_deref())
        .await?;

    Ok(Json(ContributionListResponse {
        transactions: contributions.iter().map(ContributionResponse::from).collect(),
    }))
}
