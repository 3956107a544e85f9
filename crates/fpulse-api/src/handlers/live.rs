//! Live MJPEG streaming handler.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header;
use axum::response::Response;
use axum::extract::State;
use futures_util::StreamExt;
use tracing::info;

use fpulse_pipeline::{LiveConfig, LiveSession, VideoFrameSource};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Part boundary for the `multipart/x-mixed-replace` stream.
const FRAME_BOUNDARY: &str = "frame";

/// Stream annotated frames from the configured video source.
///
/// GET /live. One session at a time; a second request gets 409 while the
/// first is still running.
pub async fn live_stream(State(state): State<AppState>) -> ApiResult<Response> {
    let permit = state.live_gate.try_acquire().ok_or(ApiError::SourceBusy)?;

    let source =
        VideoFrameSource::open(&state.config.video_source, state.config.realtime_pacing).await?;

    let live_config = LiveConfig {
        autosave_interval: state.config.autosave_interval,
        autosave_path: state.config.autosave_path.clone(),
        jpeg_quality: state.config.jpeg_quality,
        ..LiveConfig::default()
    };

    let session = LiveSession::start(
        source,
        Arc::clone(&state.adapter),
        state.store.clone(),
        live_config,
        permit,
    );
    info!(session_id = %session.session_id(), "Live stream connected");

    let stream = session
        .into_stream()
        .map(|item| item.map(|jpeg| frame_segment(&jpeg)));

    Response::builder()
        .header(
            header::CONTENT_TYPE,
            format!("multipart/x-mixed-replace; boundary={}", FRAME_BOUNDARY),
        )
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::internal(format!("Failed to build stream response: {}", e)))
}

/// Wrap one encoded frame into a multipart segment.
fn frame_segment(jpeg: &[u8]) -> Vec<u8> {
    let header = format!(
        "--{}\r\nContent-Type: image/jpeg\r\n\r\n",
        FRAME_BOUNDARY
    );

    let mut segment = Vec::with_capacity(header.len() + jpeg.len() + 2);
    segment.extend_from_slice(header.as_bytes());
    segment.extend_from_slice(jpeg);
    segment.extend_from_slice(b"\r\n");
    segment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_segment_layout() {
        let segment = frame_segment(&[0xFF, 0xD8, 0xFF]);

        let expected_prefix = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n";
        assert!(segment.starts_with(expected_prefix));
        assert!(segment.ends_with(b"\xFF\xD8\xFF\r\n"));
    }
}
