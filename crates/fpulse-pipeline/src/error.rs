//! Error types for the live pipeline.

use std::path::PathBuf;

use thiserror::Error;

use fpulse_detect::DetectorError;
use fpulse_export::ExportError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("video source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("ffmpeg binary not found in PATH")]
    FfmpegNotFound,

    #[error("ffprobe binary not found in PATH")]
    FfprobeNotFound,

    #[error("ffprobe failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("invalid video: {0}")]
    InvalidVideo(String),

    #[error("frame pipe error: {0}")]
    FramePipe(String),

    #[error("a live session is already running")]
    SourceBusy,

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn probe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
            stderr,
        }
    }

    pub fn invalid_video(message: impl Into<String>) -> Self {
        Self::InvalidVideo(message.into())
    }

    pub fn frame_pipe(message: impl Into<String>) -> Self {
        Self::FramePipe(message.into())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
