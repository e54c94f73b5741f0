//! Aggregator trait and HTTP client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jobnet_models::{AggregatedResults, SearchParams};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::{AggregatorError, AggregatorResult};

/// A multi-source job search aggregator.
///
/// Implementations merge results from several upstream job sources, apply
/// per-source dedup, and report per-source diagnostics in `source_results`.
/// A source failing is not an error here; only a failure of the aggregation
/// as a whole is.
#[async_trait]
pub trait JobAggregator: Send + Sync {
    async fn search(&self, params: &SearchParams) -> AggregatorResult<AggregatedResults>;
}

/// Aggregator reached over HTTP: normalized params are POSTed as JSON and
/// the aggregated result set comes back as JSON.
#[derive(Debug)]
pub struct HttpAggregator {
    endpoint: Url,
    client: Client,
}

impl HttpAggregator {
    /// Create a client for the aggregator search endpoint.
    ///
    /// `timeout` bounds each call end to end.
    pub fn new(endpoint: &str, timeout: Duration) -> AggregatorResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AggregatorError::invalid_url(format!("{}: {}", endpoint, e)))?;

        match endpoint.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AggregatorError::invalid_url(format!(
                    "unsupported scheme '{}'",
                    scheme
                )))
            }
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl JobAggregator for HttpAggregator {
    async fn search(&self, params: &SearchParams) -> AggregatorResult<AggregatedResults> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Aggregator returned error status");
            return Err(AggregatorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let results: AggregatedResults = serde_json::from_str(&text)
            .map_err(|e| AggregatorError::decode(e.to_string()))?;

        debug!(
            total = results.total_count,
            sources = results.source_results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Aggregator call completed"
        );

        Ok(results)
    }
}
