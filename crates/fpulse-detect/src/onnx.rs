//! YOLOv8 object detection over ONNX Runtime.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{imageops::FilterType, RgbImage};
use ndarray::Array;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use fpulse_models::Detection;

use crate::adapter::{DetectionAdapter, DetectionOutput};
use crate::annotate::annotate;
use crate::classes::label_for;
use crate::error::{DetectorError, DetectorResult};

/// YOLOv8 output shape is `[1, 84, 8400]`:
/// 84 = 4 bbox coordinates + 80 class scores, 8400 detection candidates.
const NUM_CLASSES: usize = 80;
const NUM_BOXES: usize = 8400;
const NUM_FEATURES: usize = 84;

/// Configuration for the ONNX detector.
#[derive(Debug, Clone)]
pub struct OnnxDetectorConfig {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Confidence threshold for detections
    pub confidence_threshold: f32,
    /// IoU threshold for NMS
    pub nms_threshold: f32,
    /// Input image size (the model expects square input)
    pub input_size: u32,
}

impl Default for OnnxDetectorConfig {
    fn default() -> Self {
        Self {
            model_path: "models/yolov8n.onnx".to_string(),
            confidence_threshold: 0.25,
            nms_threshold: 0.45,
            input_size: 640,
        }
    }
}

/// YOLOv8 detector backed by ONNX Runtime on the CPU execution provider.
///
/// Inference runs on a blocking thread so CPU-bound work never stalls the
/// async runtime.
pub struct OnnxDetector {
    inner: Arc<DetectorInner>,
}

struct DetectorInner {
    session: Mutex<Session>,
    config: OnnxDetectorConfig,
}

impl OnnxDetector {
    /// Build a detector, failing fast when the model file is absent or
    /// cannot be loaded.
    pub fn new(config: OnnxDetectorConfig) -> DetectorResult<Self> {
        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            return Err(DetectorError::model_not_found(&config.model_path));
        }

        let session = Mutex::new(create_session(model_path)?);
        info!(
            model_path = %config.model_path,
            input_size = config.input_size,
            "object detector initialized"
        );

        Ok(Self {
            inner: Arc::new(DetectorInner { session, config }),
        })
    }

    pub fn config(&self) -> &OnnxDetectorConfig {
        &self.inner.config
    }
}

#[async_trait]
impl DetectionAdapter for OnnxDetector {
    async fn detect(&self, frame: &RgbImage) -> DetectorResult<DetectionOutput> {
        let inner = Arc::clone(&self.inner);
        let frame = frame.clone();
        tokio::task::spawn_blocking(move || inner.detect_and_annotate(&frame))
            .await
            .map_err(|e| DetectorError::inference(format!("inference task join error: {}", e)))?
    }
}

impl DetectorInner {
    fn detect_and_annotate(&self, frame: &RgbImage) -> DetectorResult<DetectionOutput> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(DetectorError::invalid_frame("zero-sized frame"));
        }

        let input = preprocess(frame, self.config.input_size)?;
        let raw = self.run_inference(input)?;
        let detections = postprocess(&raw, frame.width(), frame.height(), &self.config)?;
        debug!(count = detections.len(), "object detection completed");

        let annotated = annotate(frame, &detections);
        Ok(DetectionOutput {
            detections,
            annotated: Some(annotated),
        })
    }

    fn run_inference(&self, input: Value) -> DetectorResult<Vec<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| DetectorError::session("session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| DetectorError::inference(format!("ONNX inference failed: {}", e)))?;

        let output = outputs
            .get("output0")
            .ok_or_else(|| DetectorError::inference("missing output0 tensor"))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::inference(format!("failed to extract tensor: {}", e)))?;

        Ok(tensor.1.iter().copied().collect())
    }
}

fn create_session(model_path: &Path) -> DetectorResult<Session> {
    let model_bytes = std::fs::read(model_path)
        .map_err(|e| DetectorError::session(format!("failed to read model file: {}", e)))?;

    Session::builder()
        .map_err(|e| DetectorError::session(format!("failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| DetectorError::session(format!("failed to set optimization level: {}", e)))?
        .commit_from_memory(&model_bytes)
        .map_err(|e| DetectorError::session(format!("failed to load ONNX model: {}", e)))
}

/// Resize to the model input size, normalize to [0, 1] and lay the pixels
/// out in NCHW order.
fn preprocess(frame: &RgbImage, input_size: u32) -> DetectorResult<Value> {
    let resized = image::imageops::resize(frame, input_size, input_size, FilterType::Triangle);
    let (w, h) = (input_size as usize, input_size as usize);

    // HWC -> CHW
    let mut chw_data: Vec<f32> = Vec::with_capacity(3 * h * w);
    for c in 0..3 {
        for y in 0..h {
            for x in 0..w {
                let pixel = resized.get_pixel(x as u32, y as u32);
                chw_data.push(pixel[c] as f32 / 255.0);
            }
        }
    }

    let shape = vec![1usize, 3, h, w];
    Tensor::from_array((shape, chw_data.into_boxed_slice()))
        .map(Value::from)
        .map_err(|e| DetectorError::inference(format!("failed to create input tensor: {}", e)))
}

/// Parse raw model output into thresholded, NMS-filtered detections in
/// normalized coordinates.
fn postprocess(
    outputs: &[f32],
    orig_width: u32,
    orig_height: u32,
    config: &OnnxDetectorConfig,
) -> DetectorResult<Vec<Detection>> {
    if outputs.len() != NUM_FEATURES * NUM_BOXES {
        return Err(DetectorError::inference(format!(
            "unexpected output size: expected {}, got {}",
            NUM_FEATURES * NUM_BOXES,
            outputs.len()
        )));
    }

    // Transpose [84, 8400] to [8400, 84] for per-candidate access
    let output_array = Array::from_shape_vec((NUM_FEATURES, NUM_BOXES), outputs.to_vec())
        .map_err(|e| DetectorError::inference(format!("failed to reshape output: {}", e)))?;
    let transposed = output_array.t();

    let mut candidates: Vec<Detection> = Vec::new();
    let input_size = config.input_size as f32;
    let scale_w = orig_width as f32 / input_size;
    let scale_h = orig_height as f32 / input_size;

    for i in 0..NUM_BOXES {
        // Bbox in center format, model coordinates
        let cx = transposed[[i, 0]];
        let cy = transposed[[i, 1]];
        let w = transposed[[i, 2]];
        let h = transposed[[i, 3]];

        let mut best_class = 0;
        let mut best_score = 0.0f32;
        for c in 0..NUM_CLASSES {
            let score = transposed[[i, 4 + c]];
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }

        if best_score < config.confidence_threshold {
            continue;
        }

        // Center format to corner format, scaled to the original image
        let x = (cx - w / 2.0) * scale_w;
        let y = (cy - h / 2.0) * scale_h;
        let width = w * scale_w;
        let height = h * scale_h;

        let x_norm = (x / orig_width as f32).clamp(0.0, 1.0);
        let y_norm = (y / orig_height as f32).clamp(0.0, 1.0);
        let w_norm = (width / orig_width as f32).min(1.0 - x_norm);
        let h_norm = (height / orig_height as f32).min(1.0 - y_norm);

        candidates.push(Detection {
            x: x_norm,
            y: y_norm,
            width: w_norm,
            height: h_norm,
            class_id: best_class,
            class_label: label_for(best_class).map(str::to_string),
            confidence: best_score,
        });
    }

    Ok(non_maximum_suppression(candidates, config.nms_threshold))
}

/// Class-aware non-maximum suppression: drop lower-confidence detections of
/// the same class overlapping above the IoU threshold.
fn non_maximum_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }

    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i].clone());

        for j in (i + 1)..detections.len() {
            if suppressed[j] || detections[i].class_id != detections[j].class_id {
                continue;
            }
            if compute_iou(&detections[i], &detections[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

fn compute_iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.area() + b.area() - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(class_id: usize, confidence: f32, bbox: (f32, f32, f32, f32)) -> Detection {
        Detection {
            x: bbox.0,
            y: bbox.1,
            width: bbox.2,
            height: bbox.3,
            class_id,
            class_label: label_for(class_id).map(str::to_string),
            confidence,
        }
    }

    #[test]
    fn test_config_default() {
        let config = OnnxDetectorConfig::default();
        assert_eq!(config.model_path, "models/yolov8n.onnx");
        assert_eq!(config.input_size, 640);
        assert!((config.confidence_threshold - 0.25).abs() < 0.001);
        assert!((config.nms_threshold - 0.45).abs() < 0.001);
    }

    #[test]
    fn test_missing_model_fails_fast() {
        let config = OnnxDetectorConfig {
            model_path: "does/not/exist.onnx".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            OnnxDetector::new(config),
            Err(DetectorError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_iou_identical_boxes() {
        let a = detection(0, 0.9, (0.1, 0.1, 0.2, 0.2));
        let b = detection(0, 0.8, (0.1, 0.1, 0.2, 0.2));
        assert!((compute_iou(&a, &b) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let a = detection(0, 0.9, (0.0, 0.0, 0.1, 0.1));
        let b = detection(0, 0.8, (0.5, 0.5, 0.1, 0.1));
        assert_eq!(compute_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_nms_suppresses_same_class_overlap() {
        let detections = vec![
            detection(0, 0.7, (0.11, 0.1, 0.2, 0.2)),
            detection(0, 0.9, (0.1, 0.1, 0.2, 0.2)),
        ];
        let kept = non_maximum_suppression(detections, 0.45);

        assert_eq!(kept.len(), 1);
        assert!((kept[0].confidence - 0.9).abs() < 0.001);
    }

    #[test]
    fn test_nms_keeps_different_classes() {
        let detections = vec![
            detection(0, 0.9, (0.1, 0.1, 0.2, 0.2)),
            detection(2, 0.8, (0.1, 0.1, 0.2, 0.2)),
        ];
        assert_eq!(non_maximum_suppression(detections, 0.45).len(), 2);
    }

    #[test]
    fn test_postprocess_rejects_wrong_size() {
        let config = OnnxDetectorConfig::default();
        assert!(matches!(
            postprocess(&[0.0; 10], 640, 640, &config),
            Err(DetectorError::Inference(_))
        ));
    }

    #[test]
    fn test_postprocess_extracts_strong_candidate() {
        let config = OnnxDetectorConfig::default();
        let mut raw = vec![0.0f32; NUM_FEATURES * NUM_BOXES];

        // Candidate 0: 64x64 box centered at (320, 320), person score 0.9
        raw[0] = 320.0; // cx (feature 0)
        raw[NUM_BOXES] = 320.0; // cy (feature 1)
        raw[2 * NUM_BOXES] = 64.0; // w
        raw[3 * NUM_BOXES] = 64.0; // h
        raw[4 * NUM_BOXES] = 0.9; // person score

        // Candidate 1: near-identical box, lower score, suppressed by NMS
        raw[1] = 322.0;
        raw[NUM_BOXES + 1] = 320.0;
        raw[2 * NUM_BOXES + 1] = 64.0;
        raw[3 * NUM_BOXES + 1] = 64.0;
        raw[4 * NUM_BOXES + 1] = 0.8;

        let detections = postprocess(&raw, 640, 640, &config).unwrap();

        assert_eq!(detections.len(), 1);
        let person = &detections[0];
        assert_eq!(person.class_id, 0);
        assert_eq!(person.label(), Some("person"));
        assert!((person.confidence - 0.9).abs() < 0.001);
        assert!((person.x - 0.45).abs() < 0.001);
        assert!((person.width - 0.1).abs() < 0.001);
    }
}
