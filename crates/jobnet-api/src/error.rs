//! API error types.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jobnet_models::SourceResult;
use serde::Serialize;
use thiserror::Error;

use crate::services::SearchError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Shown instead of upstream failure details in production.
pub const GENERIC_ERROR_DETAILS: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited")]
    RateLimited { retry_after: u64 },

    #[error("No jobs found")]
    NoResults { source_results: Vec<SourceResult> },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Replace failure details with a generic message when `production` is set.
    pub fn redacted(self, production: bool) -> Self {
        match self {
            ApiError::Upstream(_) if production => ApiError::Upstream(GENERIC_ERROR_DETAILS.to_string()),
            ApiError::Internal(_) if production => ApiError::Internal(GENERIC_ERROR_DETAILS.to_string()),
            other => other,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NoResults { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::RateLimited { retry_after_secs } => ApiError::RateLimited {
                retry_after: retry_after_secs,
            },
            SearchError::NoResults { source_results } => ApiError::NoResults { source_results },
            SearchError::Upstream(_) | SearchError::Timeout(_) => ApiError::Upstream(err.to_string()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitedResponse {
    error: &'static str,
    retry_after: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_results: Option<Vec<SourceResult>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details,
            source_results: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            ApiError::RateLimited { retry_after } => {
                let body = RateLimitedResponse {
                    error: "Too many requests. Please try again later.",
                    retry_after,
                };
                let mut response = (status, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }
            ApiError::NoResults { source_results } => {
                let body = ErrorResponse {
                    source_results: Some(source_results),
                    ..ErrorResponse::new(
                        "No jobs found",
                        Some(
                            "None of the job sources returned results. Please try again or adjust your search."
                                .to_string(),
                        ),
                    )
                };
                (status, Json(body)).into_response()
            }
            ApiError::BadRequest(msg) => {
                (status, Json(ErrorResponse::new("Invalid search request", Some(msg)))).into_response()
            }
            ApiError::Upstream(details) | ApiError::Internal(details) => {
                let details = Some(details).filter(|d| !d.is_empty());
                (status, Json(ErrorResponse::new("Failed to search jobs", details))).into_response()
            }
        }
    }
}
