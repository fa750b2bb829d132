//! Wallet auth endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};

use crate::dto::{ConnectRequest, ProfileResponse, UserEnvelope, UserResponse, WalletAddressQuery};
use crate::error::ApiResult;
use crate::state::AppState;

/// Connect a wallet, creating the user on first use
pub async fn connect(
    State(state): State<AppState>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> ApiResult<Json<UserEnvelope<UserResponse>>> {
    let Json(req) = payload?;

    let user = state
        .users()
        .connect(
            req.wallet_address.as_deref(),
            req.email.as_deref(),
            req.username.as_deref(),
        )
        .await?;

    Ok(Json(UserEnvelope {
        user: UserResponse::from(&user),
    }))
}

/// User profile with owned campaigns and counts
pub async fn profile(
    State(state): State<AppState>,
    query: Result<Query<WalletAddressQuery>, QueryRejection>,
) -> ApiResult<Json<UserEnvelope<ProfileResponse>>> {
    let Query(query) = query?;

    let profile = state
        .users()
        .profile(query.wallet_address.as_deref())
        .await?;

    Ok(Json(UserEnvelope {
        user: ProfileResponse::from(&profile),
    }))
}
