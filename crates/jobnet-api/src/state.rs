//! Application state.

use std::sync::Arc;

use jobnet_aggregator::{AggregatorResult, HttpAggregator, JobAggregator};

use crate::config::ApiConfig;
use crate::services::SearchService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub search: Arc<SearchService>,
}

impl AppState {
    /// Create application state backed by the HTTP aggregator.
    pub fn new(config: ApiConfig) -> AggregatorResult<Self> {
        let aggregator = HttpAggregator::new(
            &config.search.aggregator_url,
            config.search.aggregator_timeout,
        )?;
        Ok(Self::with_aggregator(config, Arc::new(aggregator)))
    }

    /// Create application state around any aggregator implementation.
    pub fn with_aggregator(config: ApiConfig, aggregator: Arc<dyn JobAggregator>) -> Self {
        let search = SearchService::new(&config.search, aggregator);
        Self {
            config,
            search: Arc::new(search),
        }
    }
}
