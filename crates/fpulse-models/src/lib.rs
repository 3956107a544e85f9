//! Shared data models for the FramePulse analytics pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Detected objects and per-frame observations
//! - Analytics store records
//! - Aggregated summaries and frame-transition series

pub mod detection;
pub mod record;
pub mod summary;

// Re-export common types
pub use detection::Detection;
pub use record::{DetectionRecord, FrameObservation};
pub use summary::{AnalyticsSummary, ClassCount, TransitionEdge};
