//! API configuration.

use std::path::PathBuf;

/// Server and pipeline configuration, populated from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Allowed CORS origins. `*` enables the permissive wildcard layer.
    pub cors_origins: Vec<String>,
    /// Per-IP requests per second on rate-limited routes.
    pub rate_limit_rps: u32,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Deployment environment name.
    pub environment: String,

    /// Analytics store capacity in records.
    pub store_capacity: usize,
    /// Autosave the history every N appended frames (0 disables).
    pub autosave_interval: u64,
    /// Autosave destination file.
    pub autosave_path: PathBuf,
    /// Default record window for `n` query parameters.
    pub default_window: i64,
    /// Default class count for `k` query parameters.
    pub default_top_k: usize,

    /// Video file or device consumed by the live stream.
    pub video_source: PathBuf,
    /// Pace file decoding at native frame rate.
    pub realtime_pacing: bool,
    /// JPEG encode quality for streamed and returned frames.
    pub jpeg_quality: u8,

    /// ONNX model file.
    pub model_path: String,
    /// Minimum confidence for a detection to be kept.
    pub confidence_threshold: f32,
    /// IoU threshold for non-maximum suppression.
    pub nms_threshold: f32,
    /// Square model input edge in pixels.
    pub model_input_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            max_body_size: 10 * 1024 * 1024,
            environment: "development".to_string(),
            store_capacity: 2000,
            autosave_interval: 50,
            autosave_path: PathBuf::from("analytics.csv"),
            default_window: 50,
            default_top_k: 5,
            video_source: PathBuf::from("video.mp4"),
            realtime_pacing: true,
            jpeg_quality: 80,
            model_path: "models/yolov8n.onnx".to_string(),
            confidence_threshold: 0.25,
            nms_threshold: 0.45,
            model_input_size: 640,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .ok()
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);

        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins,
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            store_capacity: std::env::var("STORE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.store_capacity),
            autosave_interval: std::env::var("AUTOSAVE_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.autosave_interval),
            autosave_path: std::env::var("AUTOSAVE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.autosave_path),
            default_window: std::env::var("DEFAULT_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_window),
            default_top_k: std::env::var("DEFAULT_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_top_k),
            video_source: std::env::var("VIDEO_SOURCE")
                .map(PathBuf::from)
                .unwrap_or(defaults.video_source),
            realtime_pacing: std::env::var("REALTIME_PACING")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.realtime_pacing),
            jpeg_quality: std::env::var("JPEG_QUALITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.jpeg_quality),
            model_path: std::env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            confidence_threshold: std::env::var("CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.confidence_threshold),
            nms_threshold: std::env::var("NMS_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.nms_threshold),
            model_input_size: std::env::var("MODEL_INPUT_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.model_input_size),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();

        assert_eq!(config.port, 8000);
        assert_eq!(config.store_capacity, 2000);
        assert_eq!(config.autosave_interval, 50);
        assert_eq!(config.default_window, 50);
        assert_eq!(config.default_top_k, 5);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert!(!config.is_production());
    }
}
