//! Job posting definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::{deserialize_lenient_opt_string, deserialize_lenient_string};

/// A single job posting as returned by the aggregator.
///
/// Providers are inconsistent, so text fields tolerate `null` and scalar
/// values of the wrong type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    /// Source-qualified ID, unique within one aggregated result set
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub title: String,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub company: String,

    /// Free-text location ("Remote", "Berlin, DE", ...)
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub location: String,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub description: String,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<Salary>,

    #[serde(
        default,
        deserialize_with = "deserialize_lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_type: Option<String>,

    /// Free text containing a relative-day count, e.g. "3 days ago"
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub posted_date: Option<String>,

    /// Name of the originating provider
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub source: String,
}

/// Salary as reported by a provider, kept exactly as sent.
///
/// Providers either send a free-text range or a structured amount. The
/// structured amount shows up both flat (`{minValue, maxValue}`) and nested
/// under `value`. Bounds are read on demand so a posting serializes back
/// unchanged, sibling fields and integer amounts included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Salary(Value);

/// Structured salary bounds, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SalaryRange {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl Salary {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Free-text salary such as "$100k - $140k".
    pub fn text(text: impl Into<String>) -> Self {
        Self(Value::String(text.into()))
    }

    pub fn as_text(&self) -> Option<&str> {
        self.0.as_str()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Structured bounds, for any object-shaped salary.
    ///
    /// A `value` object takes precedence over top-level bounds.
    pub fn range(&self) -> Option<SalaryRange> {
        let object = self.0.as_object()?;
        let bounds = object
            .get("value")
            .and_then(Value::as_object)
            .unwrap_or(object);
        Some(SalaryRange {
            min_value: bounds.get("minValue").and_then(Value::as_f64),
            max_value: bounds.get("maxValue").and_then(Value::as_f64),
        })
    }

    /// Whether the provider sent something other than null or blank text.
    pub fn is_present(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        }
    }
}
