//! Error types for detection backends.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),

    #[error("failed to initialize inference session: {0}")]
    Session(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

impl DetectorError {
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::Session(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame(message.into())
    }
}

pub type DetectorResult<T> = Result<T, DetectorError>;
