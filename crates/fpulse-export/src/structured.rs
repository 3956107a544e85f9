//! JSON export of detection records.

use fpulse_models::DetectionRecord;

use crate::error::{ExportError, ExportResult};

/// Serialize a snapshot as a pretty-printed JSON array, oldest record first.
pub fn to_json(records: &[DetectionRecord]) -> ExportResult<Vec<u8>> {
    if records.is_empty() {
        return Err(ExportError::EmptyStore);
    }
    Ok(serde_json::to_vec_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpulse_models::FrameObservation;
    use std::collections::BTreeMap;

    #[test]
    fn test_empty_snapshot_is_an_error() {
        assert!(matches!(to_json(&[]), Err(ExportError::EmptyStore)));
    }

    #[test]
    fn test_round_trips_through_serde() {
        let mut counts = BTreeMap::new();
        counts.insert("person".to_string(), 2u64);
        let records = vec![DetectionRecord::new(
            7,
            FrameObservation {
                total_detections: 2,
                per_class_counts: counts,
                classes_available: true,
            },
        )];

        let bytes = to_json(&records).unwrap();
        let parsed: Vec<DetectionRecord> = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].frame_ordinal, 7);
        assert_eq!(parsed[0].per_class_counts.get("person"), Some(&2));
    }
}
