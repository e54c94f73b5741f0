//! Search orchestration.
//!
//! A request moves through: rate check, cache lookup, and on a miss one
//! aggregator call followed by filtering and a cache store. Cache hits are
//! returned as stored; filters ran before the entry was written.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jobnet_aggregator::{AggregatorError, JobAggregator};
use jobnet_models::{AggregatedResults, JobPosting, SearchParams, SourceResult};
use thiserror::Error;
use tracing::{info, warn};

use super::cache_key::CacheKey;
use super::filters::apply_filters;
use super::rate_limiter::FixedWindowRateLimiter;
use super::result_cache::ResultCache;
use crate::config::SearchConfig;
use crate::metrics;

/// Errors that end a search before a result set is produced.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("No jobs found from any source")]
    NoResults { source_results: Vec<SourceResult> },

    #[error("Aggregator failed: {0}")]
    Upstream(#[from] AggregatorError),

    #[error("Aggregator timed out after {0:?}")]
    Timeout(Duration),
}

/// A successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub jobs: Vec<JobPosting>,
    pub total_count: usize,
    pub jobs_by_source: BTreeMap<String, usize>,
    pub cached: bool,
    /// Aggregator diagnostics, only present on a fresh fetch
    pub search_time: Option<u64>,
    pub duplicates_removed: Option<usize>,
    pub source_results: Option<Vec<SourceResult>>,
}

impl SearchOutcome {
    fn from_cache(jobs: Vec<JobPosting>) -> Self {
        Self {
            total_count: jobs.len(),
            jobs_by_source: AggregatedResults::count_by_source(&jobs),
            jobs,
            cached: true,
            search_time: None,
            duplicates_removed: None,
            source_results: None,
        }
    }

    fn fresh(jobs: Vec<JobPosting>, results: AggregatedResults) -> Self {
        Self {
            total_count: jobs.len(),
            jobs_by_source: AggregatedResults::count_by_source(&jobs),
            jobs,
            cached: false,
            search_time: Some(results.search_time),
            duplicates_removed: Some(results.duplicates_removed),
            source_results: Some(results.source_results),
        }
    }
}

/// Owns the rate-limit table and the result cache and fronts the aggregator.
pub struct SearchService {
    rate_limiter: FixedWindowRateLimiter,
    cache: ResultCache,
    aggregator: Arc<dyn JobAggregator>,
    aggregator_timeout: Duration,
}

impl SearchService {
    pub fn new(config: &SearchConfig, aggregator: Arc<dyn JobAggregator>) -> Self {
        Self {
            rate_limiter: FixedWindowRateLimiter::new(
                config.rate_limit_max,
                config.rate_limit_window,
                config.rate_limit_max_clients,
            ),
            cache: ResultCache::new(config.cache_ttl, config.cache_max_entries),
            aggregator,
            aggregator_timeout: config.aggregator_timeout,
        }
    }

    /// Run one search on behalf of `client_key`.
    pub async fn search(
        &self,
        client_key: &str,
        params: &SearchParams,
    ) -> Result<SearchOutcome, SearchError> {
        let decision = self.rate_limiter.check(client_key);
        if !decision.allowed {
            warn!(client = %client_key, "Search rate limit exceeded");
            metrics::record_rate_limit_hit("search");
            return Err(SearchError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
            });
        }

        let key = CacheKey::from_params(params);
        if let Some(jobs) = self.cache.get(&key) {
            metrics::record_cache_lookup(true);
            info!(key = %key, count = jobs.len(), "Returning cached search results");
            return Ok(SearchOutcome::from_cache(jobs));
        }
        metrics::record_cache_lookup(false);

        let mut results = self.aggregate(&params.normalized()).await?;
        if results.is_empty() {
            warn!(
                failed_sources = results.failed_sources().count(),
                "Aggregator returned no jobs from any source"
            );
            return Err(SearchError::NoResults {
                source_results: results.source_results,
            });
        }

        let fetched = results.jobs.len();
        let jobs = apply_filters(std::mem::take(&mut results.jobs), params);
        self.cache.set(key, jobs.clone());

        info!(
            fetched,
            kept = jobs.len(),
            search_time_ms = results.search_time,
            "Search completed"
        );

        Ok(SearchOutcome::fresh(jobs, results))
    }

    async fn aggregate(&self, params: &SearchParams) -> Result<AggregatedResults, SearchError> {
        let start = Instant::now();
        let outcome = tokio::time::timeout(self.aggregator_timeout, self.aggregator.search(params)).await;
        let elapsed = start.elapsed().as_secs_f64();

        match outcome {
            Ok(Ok(results)) => {
                metrics::record_aggregator_call("ok", elapsed);
                Ok(results)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Aggregator call failed");
                metrics::record_aggregator_call("error", elapsed);
                Err(SearchError::Upstream(e))
            }
            Err(_) => {
                warn!(timeout = ?self.aggregator_timeout, "Aggregator call timed out");
                metrics::record_aggregator_call("timeout", elapsed);
                Err(SearchError::Timeout(self.aggregator_timeout))
            }
        }
    }

    /// Number of cached result sets.
    pub fn cache_entries(&self) -> usize {
        self.cache.len()
    }

    /// Number of clients with a rate limit window.
    pub fn tracked_clients(&self) -> usize {
        self.rate_limiter.tracked_clients()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use jobnet_aggregator::AggregatorResult;
    use mockall::mock;
    use mockall::predicate::function;
    use tokio_test::{assert_err, assert_ok};

    mock! {
        pub Aggregator {}

        #[async_trait]
        impl JobAggregator for Aggregator {
            async fn search(&self, params: &SearchParams) -> AggregatorResult<AggregatedResults>;
        }
    }

    fn posting(id: &str, location: &str, source: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: "Sales Development Rep".to_string(),
            location: location.to_string(),
            source: source.to_string(),
            ..Default::default()
        }
    }

    fn five_jobs() -> AggregatedResults {
        let jobs = vec![
            posting("indeed_0", "Remote", "indeed"),
            posting("indeed_1", "Chicago, IL", "indeed"),
            posting("adzuna_0", "Remote - US", "adzuna"),
            posting("adzuna_1", "Boston, MA", "adzuna"),
            posting("jooble_0", "remote (EMEA)", "jooble"),
        ];
        AggregatedResults {
            total_count: jobs.len(),
            jobs_by_source: AggregatedResults::count_by_source(&jobs),
            jobs,
            search_time: 640,
            duplicates_removed: 2,
            source_results: vec![SourceResult {
                source: "indeed".to_string(),
                success: true,
                response_time: 300,
                error: None,
            }],
        }
    }

    fn service(aggregator: MockAggregator) -> SearchService {
        SearchService::new(&SearchConfig::default(), Arc::new(aggregator))
    }

    fn sales_remote() -> SearchParams {
        SearchParams {
            search_query: Some("sales".to_string()),
            remote: Some(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_miss_filters_and_caches() {
        let mut aggregator = MockAggregator::new();
        aggregator
            .expect_search()
            .times(1)
            .returning(|_| Ok(five_jobs()));
        let service = service(aggregator);

        let first = assert_ok!(service.search("1.2.3.4", &sales_remote()).await);
        assert!(!first.cached);
        assert_eq!(first.total_count, 3);
        assert_eq!(first.jobs_by_source.get("adzuna"), Some(&1));
        assert_eq!(first.search_time, Some(640));
        assert_eq!(first.duplicates_removed, Some(2));
        assert_eq!(first.source_results.as_ref().map(Vec::len), Some(1));

        let second = assert_ok!(service.search("1.2.3.4", &sales_remote()).await);
        assert!(second.cached);
        assert_eq!(second.jobs, first.jobs);
        assert_eq!(second.total_count, 3);
        assert_eq!(second.search_time, None);
        assert_eq!(service.cache_entries(), 1);
    }

    #[tokio::test]
    async fn test_aggregator_receives_normalized_params() {
        let mut aggregator = MockAggregator::new();
        aggregator
            .expect_search()
            .with(function(|p: &SearchParams| {
                p.search_query.as_deref() == Some("Sales") && p.city.is_none()
            }))
            .times(1)
            .returning(|_| Ok(five_jobs()));
        let service = service(aggregator);

        let params = SearchParams {
            search_query: Some("  Sales ".to_string()),
            city: Some(" ".to_string()),
            ..Default::default()
        };
        assert_ok!(service.search("client", &params).await);
    }

    #[tokio::test]
    async fn test_zero_results_are_not_cached() {
        let mut aggregator = MockAggregator::new();
        aggregator.expect_search().times(2).returning(|_| {
            Ok(AggregatedResults {
                source_results: vec![SourceResult {
                    source: "indeed".to_string(),
                    success: false,
                    response_time: 5000,
                    error: Some("timeout".to_string()),
                }],
                ..Default::default()
            })
        });
        let service = service(aggregator);

        for _ in 0..2 {
            match service.search("client", &sales_remote()).await {
                Err(SearchError::NoResults { source_results }) => {
                    assert_eq!(source_results[0].error.as_deref(), Some("timeout"));
                }
                other => panic!("expected NoResults, got {other:?}"),
            }
        }
        assert_eq!(service.cache_entries(), 0);
    }

    #[tokio::test]
    async fn test_rate_limited_requests_skip_cache_and_aggregator() {
        let mut aggregator = MockAggregator::new();
        aggregator
            .expect_search()
            .times(1)
            .returning(|_| Ok(five_jobs()));
        let service = service(aggregator);

        for _ in 0..10 {
            assert_ok!(service.search("10.0.0.9", &sales_remote()).await);
        }

        match service.search("10.0.0.9", &sales_remote()).await {
            Err(SearchError::RateLimited { retry_after_secs }) => assert!(retry_after_secs > 0),
            other => panic!("expected RateLimited, got {other:?}"),
        }

        let other_client = assert_ok!(service.search("10.0.0.10", &sales_remote()).await);
        assert!(other_client.cached);
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let mut aggregator = MockAggregator::new();
        aggregator.expect_search().times(1).returning(|_| {
            Err(AggregatorError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            })
        });
        let service = service(aggregator);

        let err = assert_err!(service.search("client", &sales_remote()).await);
        assert!(matches!(err, SearchError::Upstream(AggregatorError::Status { status: 502, .. })));
        assert_eq!(service.cache_entries(), 0);
    }

    struct HangingAggregator;

    #[async_trait]
    impl JobAggregator for HangingAggregator {
        async fn search(&self, _params: &SearchParams) -> AggregatorResult<AggregatedResults> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(AggregatedResults::default())
        }
    }

    #[tokio::test]
    async fn test_hung_aggregator_times_out() {
        let config = SearchConfig {
            aggregator_timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let service = SearchService::new(&config, Arc::new(HangingAggregator));

        let err = assert_err!(service.search("client", &sales_remote()).await);
        assert!(matches!(err, SearchError::Timeout(_)));
        assert_eq!(err.to_string(), "Aggregator timed out after 20ms");
    }
}
