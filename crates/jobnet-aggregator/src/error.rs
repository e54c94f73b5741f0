//! Aggregator error types.

use thiserror::Error;

/// Result type for aggregator calls.
pub type AggregatorResult<T> = Result<T, AggregatorError>;

/// Errors that can occur while calling the aggregator.
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("Invalid aggregator URL: {0}")]
    InvalidUrl(String),

    #[error("Aggregator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Aggregator returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode aggregator response: {0}")]
    Decode(String),
}

impl AggregatorError {
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
