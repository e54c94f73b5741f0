//! Aggregated search results returned by the upstream aggregator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::{deserialize_lenient_opt_string, deserialize_lenient_string, deserialize_null_default};
use crate::JobPosting;

/// Merged result set across all upstream sources.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResults {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub jobs: Vec<JobPosting>,

    /// Total matches across all sources, after per-source dedup
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub total_count: usize,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub jobs_by_source: BTreeMap<String, usize>,

    /// Wall-clock aggregation time in milliseconds
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub search_time: u64,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub duplicates_removed: usize,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub source_results: Vec<SourceResult>,
}

/// Outcome of querying one upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub source: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub success: bool,
    /// Response time in milliseconds
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub response_time: u64,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

impl AggregatedResults {
    /// Count jobs per source name.
    pub fn count_by_source(jobs: &[JobPosting]) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for job in jobs {
            *counts.entry(job.source.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Whether the aggregator found nothing across all sources.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Sources that failed during this aggregation.
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceResult> {
        self.source_results.iter().filter(|r| !r.success)
    }
}
