//! Post-aggregation filters.
//!
//! The aggregator only understands the query, location and type; the
//! remaining user filters run here on the merged result set. Stages run in a
//! fixed order and each one treats missing or malformed data permissively,
//! so a strange posting can drop out of the results but never fails the
//! request.

use std::sync::LazyLock;

use jobnet_models::{JobPosting, Salary, SearchParams};
use regex::Regex;
use tracing::debug;

/// First `<number>k` in a free-text salary, e.g. "$100k - $140k".
static SALARY_THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)k").expect("valid salary regex"));

static FIRST_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));

type FilterStage = fn(Vec<JobPosting>, &SearchParams) -> Vec<JobPosting>;

const STAGES: [(&str, FilterStage); 4] = [
    ("remote", filter_remote),
    ("salary", filter_salary_floor),
    ("job_type", filter_job_type),
    ("recency", filter_recency),
];

/// Run every filter stage over `jobs`, in order.
pub fn apply_filters(jobs: Vec<JobPosting>, params: &SearchParams) -> Vec<JobPosting> {
    STAGES.iter().fold(jobs, |jobs, (name, stage)| {
        let before = jobs.len();
        let kept = stage(jobs, params);
        if kept.len() != before {
            debug!(stage = *name, before, after = kept.len(), "Filter stage dropped jobs");
        }
        kept
    })
}

/// Keep only jobs whose location mentions "remote" when remote is requested.
pub fn filter_remote(jobs: Vec<JobPosting>, params: &SearchParams) -> Vec<JobPosting> {
    if !params.remote_only() {
        return jobs;
    }
    jobs.into_iter()
        .filter(|job| job.location.to_lowercase().contains("remote"))
        .collect()
}

/// Drop jobs whose advertised minimum is below `salary_min` (thousands).
///
/// Jobs without a salary pass.
pub fn filter_salary_floor(jobs: Vec<JobPosting>, params: &SearchParams) -> Vec<JobPosting> {
    let Some(floor) = params.salary_min else {
        return jobs;
    };
    jobs.into_iter()
        .filter(|job| match &job.salary {
            Some(salary) if salary.is_present() => salary_min_thousands(salary) >= i64::from(floor),
            _ => true,
        })
        .collect()
}

/// Keep jobs whose type contains the requested type, ignoring case.
pub fn filter_job_type(jobs: Vec<JobPosting>, params: &SearchParams) -> Vec<JobPosting> {
    let wanted = match params.job_type.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => return jobs,
    };
    jobs.into_iter()
        .filter(|job| {
            job.job_type
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&wanted))
        })
        .collect()
}

/// Keep jobs posted within the requested number of days.
///
/// A posting date without a number counts as posted today.
pub fn filter_recency(jobs: Vec<JobPosting>, params: &SearchParams) -> Vec<JobPosting> {
    let Some(max_days) = params.posted_within.as_deref().and_then(days_threshold) else {
        return jobs;
    };
    jobs.into_iter()
        .filter(|job| {
            let days = job.posted_date.as_deref().and_then(first_integer).unwrap_or(0);
            days <= max_days
        })
        .collect()
}

/// Minimum salary in thousands.
///
/// Text salaries use the first `<number>k`; structured ones use
/// `floor(minValue / 1000)`, so a negative minimum stays negative. Anything
/// unreadable counts as 0.
pub fn salary_min_thousands(salary: &Salary) -> i64 {
    if let Some(text) = salary.as_text() {
        return SALARY_THOUSANDS
            .captures(text)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0);
    }
    salary
        .range()
        .and_then(|range| range.min_value)
        .filter(|v| v.is_finite())
        .map(|v| (v / 1000.0).floor() as i64)
        .unwrap_or(0)
}

/// Day count from a window such as "7d": every non-digit is ignored.
fn days_threshold(posted_within: &str) -> Option<u64> {
    let digits: String = posted_within.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn first_integer(text: &str) -> Option<u64> {
    FIRST_INTEGER.find(text).and_then(|m| m.as_str().parse().ok())
}
