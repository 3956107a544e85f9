//! Application state.

use std::sync::Arc;

use fpulse_analytics::AnalyticsStore;
use fpulse_detect::{DetectionAdapter, OnnxDetector, OnnxDetectorConfig};
use fpulse_pipeline::SessionGate;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: AnalyticsStore,
    pub adapter: Arc<dyn DetectionAdapter>,
    pub live_gate: SessionGate,
}

impl AppState {
    /// Create state backed by the ONNX detector. Fails when the model file
    /// is missing or the session cannot be built.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let detector = OnnxDetector::new(OnnxDetectorConfig {
            model_path: config.model_path.clone(),
            confidence_threshold: config.confidence_threshold,
            nms_threshold: config.nms_threshold,
            input_size: config.model_input_size,
        })?;

        Ok(Self::from_parts(config, Arc::new(detector)))
    }

    /// Assemble state around an already-built adapter.
    pub fn from_parts(config: ApiConfig, adapter: Arc<dyn DetectionAdapter>) -> Self {
        let store = AnalyticsStore::new(config.store_capacity);

        Self {
            config,
            store,
            adapter,
            live_gate: SessionGate::new(),
        }
    }
}
