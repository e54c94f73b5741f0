//! Search request parameters.

use serde::{Deserialize, Serialize};

use crate::utils::{
    deserialize_lenient_bool, deserialize_lenient_opt_string, deserialize_lenient_u32,
    non_empty_trimmed,
};

/// Parameters accepted by `POST /jobs/search`.
///
/// Every field is optional; an absent field does not constrain the search.
/// Wrongly typed values are coerced where possible and otherwise treated as
/// absent, so a sloppy form never fails the request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub search_query: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_description: Option<String>,

    /// Salary floor in thousands
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary_min: Option<u32>,

    /// Salary ceiling in thousands
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary_max: Option<u32>,

    #[serde(
        default,
        deserialize_with = "deserialize_lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_type: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub remote: Option<bool>,

    /// Recency window such as "7d"
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub posted_within: Option<String>,
}

impl SearchParams {
    /// Copy of these params with string fields trimmed and blank ones dropped.
    ///
    /// This is the form handed to the aggregator.
    pub fn normalized(&self) -> Self {
        Self {
            search_query: non_empty_trimmed(self.search_query.as_deref()),
            city: non_empty_trimmed(self.city.as_deref()),
            country: non_empty_trimmed(self.country.as_deref()),
            job_description: non_empty_trimmed(self.job_description.as_deref()),
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            job_type: non_empty_trimmed(self.job_type.as_deref()),
            remote: self.remote,
            posted_within: non_empty_trimmed(self.posted_within.as_deref()),
        }
    }

    /// Whether the caller asked for remote jobs only.
    pub fn remote_only(&self) -> bool {
        self.remote.unwrap_or(false)
    }
}
