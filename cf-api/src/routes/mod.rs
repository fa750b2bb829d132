//! API route handlers

pub mod achievement;
pub mod auth;
pub mod campaign;
pub mod health;
pub mod transaction;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Wallet auth
        .route("/auth", post(auth::connect).get(auth::profile))
        // Campaigns
        .route(
            "/campaigns",
            post(campaign::create_campaign).get(campaign::list_campaigns),
        )
        .route(
            "/campaigns/:id",
            get(campaign::get_campaign)
                .patch(campaign::update_campaign)
                .delete(campaign::delete_campaign),
        )
        .route("/campaigns/:id/close", post(campaign::close_campaign))
        .route("/campaigns/:id/updates", post(campaign::post_update))
        // Contributions
        .route(
            "/transactions",
            post(transaction::record_contribution).get(transaction::list_contributions),
        )
        // Achievements
        .route("/achievements/user", get(achievement::user_achievements));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .nest("/api/v1", api)
        .with_state(state)
}
