//! Search gateway services.

pub mod cache_key;
pub mod filters;
pub mod rate_limiter;
pub mod result_cache;
pub mod search;

pub use cache_key::CacheKey;
pub use filters::apply_filters;
pub use rate_limiter::{FixedWindowRateLimiter, RateLimitDecision};
pub use result_cache::ResultCache;
pub use search::{SearchError, SearchOutcome, SearchService};
