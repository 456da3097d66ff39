//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /status - Remote API indicator state as JSON

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::web::dto::StatusResponse;
use crate::web::state::AppState;

/// GET /health/live
///
/// Returns 200 while the process is alive; the remote API is not consulted.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /status
///
/// Latest result of the background health poll; the remote API is not
/// called from here.
pub async fn api_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.health_snapshot();

    Json(StatusResponse {
        status: snapshot.status,
        checked_at: snapshot.checked_at,
        error: snapshot.error,
        checks: snapshot.checks,
        api_base: state.config.api.base_url.clone(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
