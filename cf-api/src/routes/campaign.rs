//! Campaign endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use cf_core::LedgerError;
use cf_db::CampaignQuery;

use crate::dto::{
    CampaignDetailResponse, CampaignEnvelope, CampaignListQuery, CampaignListResponse,
    CampaignResponse, CreateCampaignRequest, CreatedCampaignResponse, MilestoneResponse,
    PostUpdateRequest, RequesterRequest, SuccessResponse, UpdateCampaignRequest, UpdateEnvelope,
    CampaignUpdateResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Create a campaign
pub async fn create_campaign(
    State(state): State<AppState>,
    payload: Result<Json<CreateCampaignRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CampaignEnvelope<CreatedCampaignResponse>>)> {
    let Json(req) = payload?;

    let (campaign, milestones) = state.campaigns().create(&req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CampaignEnvelope {
            campaign: CreatedCampaignResponse {
                campaign: CampaignResponse::from(&campaign),
                milestones: milestones.iter().map(MilestoneResponse::from).collect(),
            },
        }),
    ))
}

/// List campaigns, newest first
pub async fn list_campaigns(
    State(state): State<AppState>,
    query: Result<Query<CampaignListQuery>, QueryRejection>,
) -> ApiResult<Json<CampaignListResponse>> {
    let Query(query) = query?;

    let campaigns = state
        .campaigns()
        .list(&CampaignQuery {
            status: query.status,
            creator_wallet: query.creator_wallet,
            exclude_fulfilled: query.exclude_fulfilled.unwrap_or(false),
        })
        .await?;

    Ok(Json(CampaignListResponse {
        campaigns: campaigns.iter().map(CampaignResponse::from).collect(),
    }))
}

/// Campaign detail
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CampaignEnvelope<CampaignDetailResponse>>> {
    let detail = state.campaigns().detail(&id).await?;

    Ok(Json(CampaignEnvelope {
        campaign: CampaignDetailResponse::from(&detail),
    }))
}

/// Owner edit
pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCampaignRequest>, JsonRejection>,
) -> ApiResult<Json<CampaignEnvelope<CampaignResponse>>> {
    let Json(req) = payload?;

    let read_only = req.read_only_fields();
    if !read_only.is_empty() {
        return Err(LedgerError::Validation(format!(
            "read-only fields cannot be updated: {}",
            read_only.join(", ")
        ))
        .into());
    }

    let campaign = state
        .campaigns()
        .update(&id, req.requester_wallet.as_deref(), &req.to_patch_input())
        .await?;

    Ok(Json(CampaignEnvelope {
        campaign: CampaignResponse::from(&campaign),
    }))
}

/// Move a campaign to CLOSED
pub async fn close_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<RequesterRequest>>,
) -> ApiResult<Json<CampaignEnvelope<CampaignResponse>>> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();

    let campaign = state
        .campaigns()
        .close(&id, req.requester_wallet.as_deref())
        .await?;

    Ok(Json(CampaignEnvelope {
        campaign: CampaignResponse::from(&campaign),
    }))
}

/// Delete a campaign without contributions
pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<RequesterRequest>>,
) -> ApiResult<Json<SuccessResponse>> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();

    state
        .campaigns()
        .delete(&id, req.requester_wallet.as_deref())
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Post a news update
pub async fn post_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PostUpdateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UpdateEnvelope>)> {
    let Json(req) = payload?;

    let update = state
        .campaigns()
        .post_update(&id, req.title.as_deref(), req.content.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UpdateEnvelope {
            update: CampaignUpdateResponse::from(&update),
        }),
    ))
}
