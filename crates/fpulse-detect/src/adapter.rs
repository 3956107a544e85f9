//! Pluggable detection backend seam.

use async_trait::async_trait;
use fpulse_models::Detection;
use image::RgbImage;

use crate::error::DetectorResult;

/// Result of one detection pass over a frame.
#[derive(Debug, Clone, Default)]
pub struct DetectionOutput {
    pub detections: Vec<Detection>,
    /// Annotated copy of the frame. Callers fall back to the raw frame when
    /// the backend does not render one.
    pub annotated: Option<RgbImage>,
}

/// Detection backend invoked once per frame.
///
/// Callers must tolerate zero detections, detections without class labels,
/// and a missing annotated frame.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DetectionAdapter: Send + Sync {
    async fn detect(&self, frame: &RgbImage) -> DetectorResult<DetectionOutput>;
}
