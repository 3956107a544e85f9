//! Per-frame analytics records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Detection;

/// Detection counts for one frame, before a store ordinal is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FrameObservation {
    /// Number of objects detected in the frame
    pub total_detections: u64,

    /// Count per class label; only classes actually seen in the frame appear
    #[serde(default)]
    pub per_class_counts: BTreeMap<String, u64>,

    /// Whether the detector supplied class labels for this frame.
    ///
    /// `true` with an empty map means zero detections; `false` means the
    /// backend only reported box counts and the map is intentionally empty.
    pub classes_available: bool,
}

impl FrameObservation {
    /// Observation for a frame with no detections.
    pub fn empty() -> Self {
        Self {
            total_detections: 0,
            per_class_counts: BTreeMap::new(),
            classes_available: true,
        }
    }

    /// Tally a detector response into per-class counts.
    ///
    /// Labels are used only when every detection carries one; a single
    /// unlabeled box switches the whole frame to box-count-only mode so a
    /// partial tally never passes for a complete one.
    pub fn from_detections(detections: &[Detection]) -> Self {
        let classes_available = detections.iter().all(|d| d.class_label.is_some());

        let mut per_class_counts = BTreeMap::new();
        if classes_available {
            for det in detections {
                if let Some(label) = det.label() {
                    *per_class_counts.entry(label.to_string()).or_insert(0) += 1;
                }
            }
        }

        Self {
            total_detections: detections.len() as u64,
            per_class_counts,
            classes_available,
        }
    }

    /// Check the per-class counts add up to the total when labels are present.
    pub fn is_consistent(&self) -> bool {
        !self.classes_available
            || self.per_class_counts.values().sum::<u64>() == self.total_detections
    }
}

/// One analytics record per processed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionRecord {
    /// Position in the append sequence, starting at 1; never reused,
    /// not reset when older records are evicted
    pub frame_ordinal: u64,

    /// Number of objects detected in the frame
    pub total_detections: u64,

    /// Count per class label; empty when no class detected or labels unavailable
    #[serde(default)]
    pub per_class_counts: BTreeMap<String, u64>,

    /// Whether per-class data is available for this record
    pub classes_available: bool,

    /// When the record was appended
    pub recorded_at: DateTime<Utc>,
}

impl DetectionRecord {
    /// Build a record from an observation at append time.
    pub fn new(frame_ordinal: u64, observation: FrameObservation) -> Self {
        Self {
            frame_ordinal,
            total_detections: observation.total_detections,
            per_class_counts: observation.per_class_counts,
            classes_available: observation.classes_available,
            recorded_at: Utc::now(),
        }
    }

    /// Check the per-class counts add up to the total when labels are present.
    pub fn is_consistent(&self) -> bool {
        !self.classes_available
            || self.per_class_counts.values().sum::<u64>() == self.total_detections
    }
}
