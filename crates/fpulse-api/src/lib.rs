//! Axum HTTP API server.
//!
//! This crate provides:
//! - Single-image detection and the live MJPEG stream
//! - Analytics queries and CSV/JSON/PNG/PDF exports
//! - Rate limiting and CORS
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
