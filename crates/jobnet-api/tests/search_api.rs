//! Router-level tests for the search endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use jobnet_aggregator::{AggregatorError, AggregatorResult, JobAggregator};
use jobnet_api::{create_router, ApiConfig, AppState, SearchConfig};
use jobnet_models::{AggregatedResults, JobPosting, SearchParams, SourceResult};

type Responder = Box<dyn Fn() -> AggregatorResult<AggregatedResults> + Send + Sync>;

/// Aggregator double that counts calls and answers from a closure.
struct StubAggregator {
    calls: AtomicUsize,
    respond: Responder,
}

impl StubAggregator {
    fn new(respond: impl Fn() -> AggregatorResult<AggregatedResults> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            respond: Box::new(respond),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobAggregator for StubAggregator {
    async fn search(&self, _params: &SearchParams) -> AggregatorResult<AggregatedResults> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)()
    }
}

fn posting(id: &str, location: &str, source: &str) -> JobPosting {
    JobPosting {
        id: id.to_string(),
        title: "Account Executive".to_string(),
        company: "Acme".to_string(),
        location: location.to_string(),
        url: format!("https://jobs.example.com/{id}"),
        source: source.to_string(),
        ..Default::default()
    }
}

/// Five jobs, three of them remote.
fn five_jobs() -> AggregatedResults {
    let jobs = vec![
        posting("indeed_0", "Remote", "indeed"),
        posting("indeed_1", "Chicago, IL", "indeed"),
        posting("adzuna_0", "Remote - US", "adzuna"),
        posting("adzuna_1", "Boston, MA", "adzuna"),
        posting("jooble_0", "Fully remote", "jooble"),
    ];
    AggregatedResults {
        total_count: jobs.len(),
        jobs_by_source: AggregatedResults::count_by_source(&jobs),
        jobs,
        search_time: 950,
        duplicates_removed: 1,
        source_results: ["indeed", "adzuna", "jooble"]
            .iter()
            .map(|source| SourceResult {
                source: source.to_string(),
                success: true,
                response_time: 300,
                error: None,
            })
            .collect(),
    }
}

fn app_with(aggregator: Arc<StubAggregator>, search: SearchConfig) -> Router {
    let config = ApiConfig {
        search,
        ..Default::default()
    };
    create_router(AppState::with_aggregator(config, aggregator), None)
}

fn app(aggregator: Arc<StubAggregator>) -> Router {
    app_with(aggregator, SearchConfig::default())
}

fn search_request(body: Value, client: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/jobs/search")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Forwarded-For", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_remote_search_filters_then_serves_from_cache() {
    let aggregator = StubAggregator::new(|| Ok(five_jobs()));
    let app = app(aggregator.clone());
    let params = json!({ "searchQuery": "sales", "remote": true });

    let (status, first) = send(&app, search_request(params.clone(), "203.0.113.1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["cached"], false);
    assert_eq!(first["totalCount"], 3);
    assert_eq!(first["jobs"].as_array().unwrap().len(), 3);
    assert_eq!(first["jobsBySource"], json!({ "adzuna": 1, "indeed": 1, "jooble": 1 }));
    assert_eq!(first["searchTime"], 950);
    assert_eq!(first["duplicatesRemoved"], 1);
    assert_eq!(first["sourceResults"].as_array().unwrap().len(), 3);

    let (status, second) = send(&app, search_request(params, "203.0.113.1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["cached"], true);
    assert_eq!(second["jobs"], first["jobs"]);
    assert_eq!(second["totalCount"], 3);
    assert!(second.get("sourceResults").is_none());

    assert_eq!(aggregator.calls(), 1);
}

#[tokio::test]
async fn test_equivalent_params_share_cache_entry() {
    let aggregator = StubAggregator::new(|| Ok(five_jobs()));
    let app = app(aggregator.clone());

    send(&app, search_request(json!({ "searchQuery": "Sales ", "city": "Austin" }), "a")).await;
    let (_, body) = send(
        &app,
        search_request(
            json!({
                "searchQuery": "sales",
                "city": " austin",
                "jobDescription": "closing enterprise deals",
                "salaryMax": 250,
                "postedWithin": "30d"
            }),
            "b",
        ),
    )
    .await;

    assert_eq!(body["cached"], true);
    assert_eq!(aggregator.calls(), 1);
}

#[tokio::test]
async fn test_expired_cache_entry_triggers_fresh_fetch() {
    let aggregator = StubAggregator::new(|| Ok(five_jobs()));
    let app = app_with(
        aggregator.clone(),
        SearchConfig {
            cache_ttl: Duration::from_millis(50),
            ..Default::default()
        },
    );
    let params = json!({ "searchQuery": "sales" });

    send(&app, search_request(params.clone(), "c")).await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    let (status, body) = send(&app, search_request(params, "c")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached"], false);
    assert_eq!(aggregator.calls(), 2);
}

#[tokio::test]
async fn test_eleventh_request_is_rate_limited_until_window_elapses() {
    let aggregator = StubAggregator::new(|| Ok(five_jobs()));
    let app = app_with(
        aggregator,
        SearchConfig {
            rate_limit_window: Duration::from_millis(400),
            ..Default::default()
        },
    );
    let params = json!({ "searchQuery": "sales" });

    for _ in 0..10 {
        let (status, _) = send(&app, search_request(params.clone(), "198.51.100.20")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(search_request(params.clone(), "198.51.100.20"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
    assert!(body["retryAfter"].as_u64().unwrap() > 0);

    let (status, _) = send(&app, search_request(params.clone(), "198.51.100.21")).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(450)).await;
    let (status, _) = send(&app, search_request(params, "198.51.100.20")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_zero_results_is_503_and_not_cached() {
    let aggregator = StubAggregator::new(|| {
        Ok(AggregatedResults {
            source_results: vec![SourceResult {
                source: "indeed".to_string(),
                success: false,
                response_time: 10_000,
                error: Some("upstream timeout".to_string()),
            }],
            ..Default::default()
        })
    });
    let app = app(aggregator.clone());
    let params = json!({ "searchQuery": "underwater basket weaving" });

    let (status, body) = send(&app, search_request(params.clone(), "d")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(body["details"].is_string());
    assert_eq!(body["sourceResults"][0]["error"], "upstream timeout");

    let (status, _) = send(&app, search_request(params, "d")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(aggregator.calls(), 2);
}

#[tokio::test]
async fn test_aggregator_failure_is_500() {
    let aggregator = StubAggregator::new(|| {
        Err(AggregatorError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        })
    });
    let app = app(aggregator);

    let (status, body) = send(&app, search_request(json!({ "searchQuery": "sales" }), "e")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_production_hides_upstream_details() {
    let aggregator = StubAggregator::new(|| {
        Err(AggregatorError::Status {
            status: 502,
            body: "bad gateway from 10.0.0.7".to_string(),
        })
    });
    let config = ApiConfig {
        environment: "production".to_string(),
        ..Default::default()
    };
    let app = create_router(AppState::with_aggregator(config, aggregator), None);

    let (status, body) = send(&app, search_request(json!({ "searchQuery": "sales" }), "e2")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["details"].is_string());
    assert!(!body.to_string().contains("10.0.0.7"));
}

#[tokio::test]
async fn test_loosely_typed_filters_are_accepted() {
    let aggregator = StubAggregator::new(|| Ok(five_jobs()));
    let app = app(aggregator);

    let (status, body) = send(
        &app,
        search_request(json!({ "searchQuery": "sales", "remote": "true" }), "g"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 3);

    let (status, body) = send(
        &app,
        search_request(json!({ "searchQuery": "sales", "postedWithin": 7, "jobType": 5 }), "g"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(
        &app,
        search_request(json!({ "searchQuery": "sales", "remote": "maybe", "salaryMin": "lots" }), "g"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let aggregator = StubAggregator::new(|| Ok(five_jobs()));
    let app = app(aggregator.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/jobs/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(aggregator.calls(), 0);
}

#[tokio::test]
async fn test_health_endpoint_sets_security_headers() {
    let app = app(StubAggregator::new(|| Ok(five_jobs())));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("X-Content-Type-Options").unwrap(), "nosniff");
    assert!(response.headers().contains_key("X-Request-ID"));
}

#[tokio::test]
async fn test_ready_reports_store_sizes() {
    let app = app(StubAggregator::new(|| Ok(five_jobs())));
    send(&app, search_request(json!({ "searchQuery": "sales" }), "f")).await;

    let (status, body) = send(
        &app,
        Request::builder().uri("/ready").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["cacheEntries"], 1);
    assert_eq!(body["checks"]["rateLimitedClients"], 1);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = app(StubAggregator::new(|| Ok(five_jobs())));

    let mut request = search_request(json!({ "searchQuery": "sales" }), "h");
    request
        .headers_mut()
        .insert("X-Request-ID", "req-7f3a".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("X-Request-ID").unwrap(), "req-7f3a");
}
