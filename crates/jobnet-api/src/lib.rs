//! Axum HTTP gateway in front of the job search aggregator.
//!
//! This crate provides:
//! - `POST /jobs/search` with per-client fixed window rate limiting
//! - A TTL result cache keyed on normalized search parameters
//! - Post-aggregation filters (remote, salary floor, job type, recency)
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ApiConfig, SearchConfig};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::SearchService;
pub use state::AppState;
