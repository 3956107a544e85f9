//! Object detection backends.
//!
//! The [`DetectionAdapter`] trait is the seam between the analytics pipeline
//! and whatever produces detections. The shipped implementation is
//! [`OnnxDetector`], a YOLOv8 model running on ONNX Runtime; tests swap in
//! stubs behind the same trait.

pub mod adapter;
pub mod annotate;
pub mod classes;
pub mod error;
pub mod onnx;

pub use adapter::{DetectionAdapter, DetectionOutput};
pub use annotate::annotate;
pub use classes::{label_for, COCO_CLASSES};
pub use error::{DetectorError, DetectorResult};
pub use onnx::{OnnxDetector, OnnxDetectorConfig};
