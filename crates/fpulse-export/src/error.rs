//! Error types for the export pipeline.

use thiserror::Error;

/// Errors that can occur while exporting analytics snapshots.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The snapshot holds no records. Surfaced to API clients as a 400
    /// "No analytics yet", not as a server fault.
    #[error("no analytics data to export")]
    EmptyStore,

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn pdf(message: impl Into<String>) -> Self {
        Self::Pdf(message.into())
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
