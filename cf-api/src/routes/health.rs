//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::dto::HealthResponse;
use crate::state::AppState;

/// Liveness
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        backend: state.database.config().backend.as_str().to_string(),
    })
}

/// Readiness (verifies store connectivity)
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = match state.database.health_check().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: state.version.clone(),
            backend: state.database.config().backend.as_str().to_string(),
        }),
    )
}
