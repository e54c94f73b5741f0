//! API configuration.

use std::str::FromStr;
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Process-wide request ceiling per second, across all clients
    pub global_rate_limit_rps: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
    /// Search gateway settings
    pub search: SearchConfig,
}

/// Settings for the search gateway core.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Requests allowed per client per window
    pub rate_limit_max: u32,
    /// Fixed window length
    pub rate_limit_window: Duration,
    /// Table size above which elapsed windows are purged
    pub rate_limit_max_clients: usize,
    /// Result cache time-to-live
    pub cache_ttl: Duration,
    /// Result cache capacity, 0 for unbounded
    pub cache_max_entries: usize,
    /// Aggregator search endpoint
    pub aggregator_url: String,
    /// Upper bound on a single aggregator call
    pub aggregator_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            global_rate_limit_rps: 200,
            max_body_size: 64 * 1024, // 64KB
            environment: "development".to_string(),
            metrics_enabled: true,
            search: SearchConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rate_limit_max: 10,
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max_clients: 10_000,
            cache_ttl: Duration::from_secs(5 * 60),
            cache_max_entries: 0,
            aggregator_url: "http://localhost:8081/search".to_string(),
            aggregator_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_or("API_PORT", defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            global_rate_limit_rps: env_or("GLOBAL_RATE_LIMIT_RPS", defaults.global_rate_limit_rps),
            max_body_size: env_or("MAX_BODY_SIZE", defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            search: SearchConfig::from_env(),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

impl SearchConfig {
    /// Create search settings from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rate_limit_max: env_or("SEARCH_RATE_LIMIT_MAX", defaults.rate_limit_max),
            rate_limit_window: Duration::from_secs(env_or(
                "SEARCH_RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window.as_secs(),
            )),
            rate_limit_max_clients: env_or(
                "SEARCH_RATE_LIMIT_MAX_CLIENTS",
                defaults.rate_limit_max_clients,
            ),
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECS", defaults.cache_ttl.as_secs())),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            aggregator_url: std::env::var("AGGREGATOR_URL").unwrap_or(defaults.aggregator_url),
            aggregator_timeout: Duration::from_secs(env_or(
                "AGGREGATOR_TIMEOUT_SECS",
                defaults.aggregator_timeout.as_secs(),
            )),
        }
    }
}

/// Parse an environment variable, falling back to `default` when it is
/// missing or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
