//! API integration tests over the public router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use image::RgbImage;
use tower::ServiceExt;

use fpulse_api::{create_router, ApiConfig, AppState};
use fpulse_detect::{DetectionAdapter, DetectionOutput, DetectorResult};

struct NoopAdapter;

#[async_trait]
impl DetectionAdapter for NoopAdapter {
    async fn detect(&self, _frame: &RgbImage) -> DetectorResult<DetectionOutput> {
        Ok(DetectionOutput::default())
    }
}

/// Helper to create a test router with a stub detection backend.
fn create_test_router() -> axum::Router {
    let state = AppState::from_parts(ApiConfig::default(), Arc::new(NoopAdapter));
    // The Prometheus recorder is process-global, so the test router runs
    // without it.
    create_router(state, None)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Metrics should return OK if enabled
    assert!(
        response.status() == StatusCode::OK || response.status() == StatusCode::NOT_FOUND
    );
}

/// Test rate limiting on an export route.
#[tokio::test]
async fn test_rate_limiting() {
    let app = create_test_router();

    // The limiter keys on the forwarded client IP, so every request here
    // counts against the same bucket.
    let mut limited = false;
    for _ in 0..20 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/export/csv")
                    .header("X-Forwarded-For", "192.168.1.100")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited = true;
            break;
        }
    }

    assert!(limited, "no request was rate limited");
}

/// Test CORS preflight handling.
#[tokio::test]
async fn test_cors_preflight() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/summary")
                .header("Origin", "http://localhost:3000")
                .header("Access-Control-Request-Method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // CORS preflight should return OK or NO_CONTENT
    assert!(
        response.status() == StatusCode::OK || response.status() == StatusCode::NO_CONTENT
    );
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

/// Test the live MJPEG endpoint against a real video.
#[tokio::test]
#[ignore = "requires ffmpeg and a sample video"]
async fn test_live_stream_endpoint() {
    let config = ApiConfig {
        video_source: std::env::var("FPULSE_TEST_VIDEO")
            .unwrap_or_else(|_| "video.mp4".to_string())
            .into(),
        realtime_pacing: false,
        ..ApiConfig::default()
    };
    let state = AppState::from_parts(config, Arc::new(NoopAdapter));
    let app = create_router(state, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("multipart/x-mixed-replace"));
}
