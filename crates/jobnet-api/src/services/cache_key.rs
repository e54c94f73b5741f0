//! Cache key derivation for search parameters.

use std::fmt;

use jobnet_models::SearchParams;
use serde_json::json;

/// Normalized, serialized form of the search parameters that select a
/// cached result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for `params`.
    ///
    /// `search_query`, `city` and `country` are trimmed and lower-cased;
    /// missing values take their defaults. `job_description`, `salary_max`
    /// and `posted_within` do not take part, so searches differing only in
    /// those share one entry.
    pub fn from_params(params: &SearchParams) -> Self {
        // serde_json objects are BTreeMap-backed, so keys serialize sorted.
        let normalized = json!({
            "searchQuery": normalize_text(params.search_query.as_deref()),
            "city": normalize_text(params.city.as_deref()),
            "country": normalize_text(params.country.as_deref()),
            "salaryMin": params.salary_min.unwrap_or(0),
            "jobType": params.job_type.clone().unwrap_or_default(),
            "remote": params.remote.unwrap_or(false),
        });
        Self(normalized.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_text(value: Option<&str>) -> String {
    value.map(|s| s.trim().to_lowercase()).unwrap_or_default()
}
