//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use fpulse_detect::DetectorError;
use fpulse_export::ExportError;
use fpulse_pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Messages here are client-facing verbatim.
    #[error("{0}")]
    BadRequest(String),

    #[error("No analytics yet")]
    NoData,

    #[error("Live session already running")]
    SourceBusy,

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Pipeline error: {0}")]
    Pipeline(PipelineError),

    #[error("Export error: {0}")]
    Export(ExportError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::NoData => StatusCode::BAD_REQUEST,
            ApiError::SourceBusy => StatusCode::CONFLICT,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_)
            | ApiError::Detector(_)
            | ApiError::Pipeline(_)
            | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An empty export is a caller-visible no-data condition, not a fault.
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::EmptyStore => ApiError::NoData,
            other => ApiError::Export(other),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::SourceBusy => ApiError::SourceBusy,
            other => ApiError::Pipeline(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Internal(_)
            | ApiError::Detector(_)
            | ApiError::Pipeline(_)
            | ApiError::Export(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse { detail, code: None };

        (status, Json(body)).into_response()
    }
}
