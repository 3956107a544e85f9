//! Aggregated statistics derived from store snapshots.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A class label with its summed detection count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClassCount {
    pub label: String,
    pub count: u64,
}

impl ClassCount {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Summary statistics over a snapshot of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyticsSummary {
    /// Number of records in the snapshot
    pub frame_count: u64,

    /// Sum of every record's detection total
    pub total_detections: u64,

    /// Number of distinct class labels seen across the snapshot
    pub unique_class_count: u64,

    /// Highest-counted classes, descending; ties ordered alphabetically
    pub top_classes: Vec<ClassCount>,
}

/// One frame-to-frame edge for flow (Sankey-style) visualizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TransitionEdge {
    /// Ordinal label of the earlier frame
    pub from: String,

    /// Ordinal label of the later frame
    pub to: String,

    /// Detection total of the later frame
    pub value: u64,
}

impl TransitionEdge {
    /// Build an edge between two frame ordinals.
    pub fn new(from_ordinal: u64, to_ordinal: u64, value: u64) -> Self {
        Self {
            from: from_ordinal.to_string(),
            to: to_ordinal.to_string(),
            value,
        }
    }
}
