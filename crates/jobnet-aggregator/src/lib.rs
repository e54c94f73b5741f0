//! Client for the multi-source job search aggregator.
//!
//! This crate provides:
//! - The `JobAggregator` trait the search gateway calls on a cache miss
//! - `HttpAggregator`, a reqwest client for an aggregator served over HTTP

pub mod client;
pub mod error;

pub use client::{HttpAggregator, JobAggregator};
pub use error::{AggregatorError, AggregatorResult};
