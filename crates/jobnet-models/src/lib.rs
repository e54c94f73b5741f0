//! Shared data models for the JobNet search gateway.
//!
//! This crate provides Serde-serializable types for:
//! - Job postings returned by upstream job sources
//! - Search parameters accepted by the search endpoint
//! - Aggregated result sets and per-source diagnostics

pub mod aggregated;
pub mod job;
pub mod search;
pub mod utils;

// Re-export common types
pub use aggregated::{AggregatedResults, SourceResult};
pub use job::{JobPosting, Salary, SalaryRange};
pub use search::SearchParams;
