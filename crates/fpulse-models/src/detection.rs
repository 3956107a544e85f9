//! Detected objects as reported by a detection backend.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single detected object within one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Bounding box in normalized coordinates [0, 1]
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    /// Model class index
    pub class_id: usize,

    /// Human-readable class label; `None` when the backend cannot label boxes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_label: Option<String>,

    /// Detection confidence [0, 1]
    pub confidence: f32,
}

impl Detection {
    /// Create a labeled detection.
    pub fn labeled(
        class_id: usize,
        class_label: impl Into<String>,
        confidence: f32,
        bbox: (f32, f32, f32, f32),
    ) -> Self {
        Self {
            x: bbox.0,
            y: bbox.1,
            width: bbox.2,
            height: bbox.3,
            class_id,
            class_label: Some(class_label.into()),
            confidence,
        }
    }

    /// Create a detection without a class label (box-count-only backends).
    pub fn unlabeled(confidence: f32, bbox: (f32, f32, f32, f32)) -> Self {
        Self {
            x: bbox.0,
            y: bbox.1,
            width: bbox.2,
            height: bbox.3,
            class_id: 0,
            class_label: None,
            confidence,
        }
    }

    /// Get the class label, if the backend supplied one.
    pub fn label(&self) -> Option<&str> {
        self.class_label.as_deref()
    }

    /// Get the center point in normalized coordinates.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Get area (normalized).
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}
