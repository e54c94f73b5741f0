//! API routes.

use std::any::Any;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{health, ready, search_jobs};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, create_rate_limiter, global_rate_limit, handle_panic, request_id,
    request_logging, security_headers,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let global_limiter = create_rate_limiter(state.config.global_rate_limit_rps);
    let production = state.config.is_production();

    // Per-client limits are enforced inside the search service
    let search_routes = Router::new()
        .route("/jobs/search", post(search_jobs))
        .layer(middleware::from_fn_with_state(global_limiter, global_rate_limit));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(search_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(CatchPanicLayer::custom(
            move |err: Box<dyn Any + Send + 'static>| handle_panic(err, production),
        ))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
