//! CSV export and the autosave file writer.

use std::path::Path;

use fpulse_models::DetectionRecord;
use tracing::debug;

use crate::error::{ExportError, ExportResult};

/// Fixed column order. Per-class counts are serialized as one JSON object
/// column so the schema stays stable no matter which classes were observed.
const HEADERS: [&str; 5] = [
    "frame_ordinal",
    "total_detections",
    "per_class_counts",
    "classes_available",
    "recorded_at",
];

/// Serialize a snapshot to CSV bytes.
pub fn to_csv(records: &[DetectionRecord]) -> ExportResult<Vec<u8>> {
    if records.is_empty() {
        return Err(ExportError::EmptyStore);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for record in records {
        writer.write_record(&[
            record.frame_ordinal.to_string(),
            record.total_detections.to_string(),
            serde_json::to_string(&record.per_class_counts)?,
            record.classes_available.to_string(),
            record.recorded_at.to_rfc3339(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Serialize and overwrite the autosave file. Serialization happens before
/// any disk I/O, so callers never hold a snapshot longer than needed.
pub async fn save_csv(records: &[DetectionRecord], path: impl AsRef<Path>) -> ExportResult<()> {
    let bytes = to_csv(records)?;
    tokio::fs::write(path.as_ref(), &bytes).await?;
    debug!(
        path = %path.as_ref().display(),
        records = records.len(),
        "analytics autosave written"
    );
    Ok(())
}
