//! Job search handler.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use jobnet_models::{JobPosting, SearchParams, SourceResult};
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::middleware::ClientKey;
use crate::services::SearchOutcome;
use crate::state::AppState;

/// Successful search response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub jobs: Vec<JobPosting>,
    pub total_count: usize,
    pub jobs_by_source: BTreeMap<String, usize>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates_removed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_results: Option<Vec<SourceResult>>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            success: true,
            jobs: outcome.jobs,
            total_count: outcome.total_count,
            jobs_by_source: outcome.jobs_by_source,
            cached: outcome.cached,
            search_time: outcome.search_time,
            duplicates_removed: outcome.duplicates_removed,
            source_results: outcome.source_results,
        }
    }
}

/// Search jobs across all sources.
///
/// `POST /jobs/search` with a `SearchParams` JSON body.
pub async fn search_jobs(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    payload: Result<Json<SearchParams>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(params) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    debug!(client = %client, params = ?params, "Job search request");

    let outcome = state
        .search
        .search(&client, &params)
        .await
        .map_err(|e| ApiError::from(e).redacted(state.config.is_production()))?;

    Ok(Json(outcome.into()))
}
