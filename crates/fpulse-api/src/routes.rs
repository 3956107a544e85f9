//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::analytics::{live_analytics, sankey_data, summary};
use crate::handlers::detect::detect_image;
use crate::handlers::export::{chart_png, export_csv, export_json, export_pdf};
use crate::handlers::health::health;
use crate::handlers::live::live_stream;
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, rate_limit_middleware, request_logging, RateLimiterCache};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Per-IP rate limiter for detection and export routes
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let limited_routes = Router::new()
        .route("/detect", post(detect_image))
        .route("/export/csv", get(export_csv))
        .route("/export/json", get(export_json))
        .route("/export/pdf", get(export_pdf))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let stream_routes = Router::new().route("/live", get(live_stream));

    let analytics_routes = Router::new()
        .route("/live_analytics", get(live_analytics))
        .route("/summary", get(summary))
        .route("/chart.png", get(chart_png))
        .route("/sankey_data", get(sankey_data));

    let health_routes = Router::new().route("/health", get(health));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(limited_routes)
        .merge(stream_routes)
        .merge(analytics_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
