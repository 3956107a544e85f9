//! Live video analytics pipeline.
//!
//! Wires a frame source through a detection adapter into the analytics
//! store and exposes the annotated frames as a JPEG stream with explicit
//! termination semantics. The video source is exclusive, guarded by
//! [`SessionGate`].

pub mod error;
pub mod gate;
pub mod live;
pub mod metrics;
pub mod probe;
pub mod source;

pub use error::{PipelineError, PipelineResult};
pub use gate::{SessionGate, SessionPermit};
pub use live::{LiveConfig, LiveSession, StopReason};
pub use probe::{probe_video, VideoInfo};
pub use source::{FrameSource, VideoFrameSource};
