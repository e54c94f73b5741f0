//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

/// In-memory state sizes; both stores live for the process lifetime.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessChecks {
    pub cache_entries: usize,
    pub rate_limited_clients: usize,
}

/// Readiness check endpoint (readiness probe).
pub async fn ready(State(state): State<AppState>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready".to_string(),
        checks: ReadinessChecks {
            cache_entries: state.search.cache_entries(),
            rate_limited_clients: state.search.tracked_clients(),
        },
    })
}
