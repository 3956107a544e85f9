//! Metric names and recording helpers for the live pipeline.

use metrics::{counter, gauge};

/// Metric names as constants for consistency.
pub mod names {
    pub const FRAMES_PROCESSED_TOTAL: &str = "fpulse_frames_processed_total";
    pub const DETECTIONS_TOTAL: &str = "fpulse_detections_total";
    pub const LIVE_SESSIONS_ACTIVE: &str = "fpulse_live_sessions_active";
    pub const AUTOSAVE_FAILURES_TOTAL: &str = "fpulse_autosave_failures_total";
}

/// Record one processed frame and its detection count.
pub fn record_frame_processed(detections: u64) {
    counter!(names::FRAMES_PROCESSED_TOTAL).increment(1);
    counter!(names::DETECTIONS_TOTAL).increment(detections);
}

pub fn record_session_started() {
    gauge!(names::LIVE_SESSIONS_ACTIVE).increment(1.0);
}

pub fn record_session_ended() {
    gauge!(names::LIVE_SESSIONS_ACTIVE).decrement(1.0);
}

pub fn record_autosave_failure() {
    counter!(names::AUTOSAVE_FAILURES_TOTAL).increment(1);
}
