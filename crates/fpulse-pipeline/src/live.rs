//! Live analytics session: frames through detection into the store, encoded
//! JPEG frames out.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use futures_util::Stream;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use fpulse_analytics::AnalyticsStore;
use fpulse_detect::DetectionAdapter;
use fpulse_models::FrameObservation;

use crate::error::{PipelineError, PipelineResult};
use crate::gate::SessionPermit;
use crate::metrics::{
    record_autosave_failure, record_frame_processed, record_session_ended,
    record_session_started,
};
use crate::source::FrameSource;

/// Tunables for a live session.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Autosave the full history every N appended frames (0 disables).
    pub autosave_interval: u64,
    /// Autosave destination, overwritten on each save.
    pub autosave_path: PathBuf,
    /// JPEG encode quality for streamed frames.
    pub jpeg_quality: u8,
    /// Encoded frames buffered ahead of the client.
    pub channel_capacity: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            autosave_interval: 50,
            autosave_path: PathBuf::from("analytics.csv"),
            jpeg_quality: 80,
            channel_capacity: 8,
        }
    }
}

/// Why a live session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source delivered its last frame and closed cleanly.
    SourceExhausted,
    /// The source failed mid-stream.
    SourceFailed,
    /// The detection backend returned an error; the session never resumes.
    AdapterFailure,
    /// Streamed frame could not be encoded.
    EncodeFailed,
    /// The consumer went away.
    ClientDisconnected,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceExhausted => "source_exhausted",
            Self::SourceFailed => "source_failed",
            Self::AdapterFailure => "adapter_failure",
            Self::EncodeFailed => "encode_failed",
            Self::ClientDisconnected => "client_disconnected",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle to a running live session.
pub struct LiveSession {
    session_id: Uuid,
    frames: mpsc::Receiver<PipelineResult<Vec<u8>>>,
}

impl LiveSession {
    /// Spawn the producer loop and hand back the consumer side.
    ///
    /// The producer owns the gate permit for the whole session; it drops
    /// when the loop exits, whatever the stop reason.
    pub fn start<S>(
        mut source: S,
        adapter: Arc<dyn DetectionAdapter>,
        store: AnalyticsStore,
        config: LiveConfig,
        permit: SessionPermit,
    ) -> Self
    where
        S: FrameSource + 'static,
    {
        let session_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));

        tokio::spawn(async move {
            let _permit = permit;
            record_session_started();
            info!(session_id = %session_id, "live session started");

            let (reason, frames) =
                run_session(&mut source, adapter.as_ref(), &store, &config, &tx).await;

            record_session_ended();
            info!(
                session_id = %session_id,
                reason = %reason,
                frames,
                "live session ended"
            );
        });

        Self {
            session_id,
            frames: rx,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Consume the session as a stream of encoded JPEG frames.
    ///
    /// Source exhaustion closes the stream cleanly; a source, adapter or
    /// encode failure yields exactly one `Err` item and then closes;
    /// dropping the stream stops the producer.
    pub fn into_stream(self) -> Pin<Box<dyn Stream<Item = PipelineResult<Vec<u8>>> + Send>> {
        Box::pin(futures_util::stream::unfold(self.frames, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        }))
    }
}

async fn run_session<S: FrameSource>(
    source: &mut S,
    adapter: &dyn DetectionAdapter,
    store: &AnalyticsStore,
    config: &LiveConfig,
    tx: &mpsc::Sender<PipelineResult<Vec<u8>>>,
) -> (StopReason, u64) {
    let mut frames: u64 = 0;

    loop {
        let frame = match source.next_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => return (StopReason::SourceExhausted, frames),
            Err(e) => {
                warn!(error = %e, "frame source failed");
                let _ = tx.send(Err(e)).await;
                return (StopReason::SourceFailed, frames);
            }
        };

        let output = match adapter.detect(&frame).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "detection failed, terminating session");
                let _ = tx.send(Err(e.into())).await;
                return (StopReason::AdapterFailure, frames);
            }
        };

        // Record first, then stream; the failed-frame case above appends
        // nothing.
        let observation = FrameObservation::from_detections(&output.detections);
        record_frame_processed(observation.total_detections);
        let ordinal = store.append(observation);
        frames += 1;

        if config.autosave_interval > 0 && ordinal % config.autosave_interval == 0 {
            autosave(store, &config.autosave_path).await;
        }

        let display = output.annotated.unwrap_or(frame);
        let jpeg = match encode_jpeg(&display, config.jpeg_quality) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!(error = %e, "frame encode failed");
                let _ = tx.send(Err(e)).await;
                return (StopReason::EncodeFailed, frames);
            }
        };

        if tx.send(Ok(jpeg)).await.is_err() {
            return (StopReason::ClientDisconnected, frames);
        }
    }
}

/// Snapshot, then write. Failures are logged and counted, never fatal to
/// the session.
async fn autosave(store: &AnalyticsStore, path: &Path) {
    let snapshot = store.snapshot(None);
    if let Err(e) = fpulse_export::save_csv(&snapshot, path).await {
        warn!(error = %e, path = %path.display(), "analytics autosave failed");
        record_autosave_failure();
    }
}

fn encode_jpeg(frame: &RgbImage, quality: u8) -> PipelineResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder.encode_image(frame)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;
    use futures_util::StreamExt;
    use image::Rgb;

    use fpulse_detect::{DetectionOutput, DetectorError, DetectorResult};
    use fpulse_models::Detection;

    use crate::gate::SessionGate;

    fn gray_frame() -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb([9, 9, 9]))
    }

    struct StaticFrames {
        frames: VecDeque<RgbImage>,
    }

    impl StaticFrames {
        fn new(count: usize) -> Self {
            Self {
                frames: (0..count).map(|_| gray_frame()).collect(),
            }
        }
    }

    #[async_trait]
    impl FrameSource for StaticFrames {
        async fn next_frame(&mut self) -> PipelineResult<Option<RgbImage>> {
            Ok(self.frames.pop_front())
        }
    }

    struct EndlessFrames;

    #[async_trait]
    impl FrameSource for EndlessFrames {
        async fn next_frame(&mut self) -> PipelineResult<Option<RgbImage>> {
            Ok(Some(gray_frame()))
        }
    }

    struct BrokenPipe {
        served: usize,
    }

    #[async_trait]
    impl FrameSource for BrokenPipe {
        async fn next_frame(&mut self) -> PipelineResult<Option<RgbImage>> {
            if self.served == 0 {
                self.served += 1;
                Ok(Some(gray_frame()))
            } else {
                Err(PipelineError::frame_pipe("pipe burst"))
            }
        }
    }

    struct OnePersonAdapter;

    #[async_trait]
    impl DetectionAdapter for OnePersonAdapter {
        async fn detect(&self, _frame: &RgbImage) -> DetectorResult<DetectionOutput> {
            Ok(DetectionOutput {
                detections: vec![Detection::labeled(0, "person", 0.9, (0.1, 0.1, 0.2, 0.2))],
                annotated: None,
            })
        }
    }

    struct FailingAdapter;

    #[async_trait]
    impl DetectionAdapter for FailingAdapter {
        async fn detect(&self, _frame: &RgbImage) -> DetectorResult<DetectionOutput> {
            Err(DetectorError::inference("backend exploded"))
        }
    }

    fn test_config(dir: &tempfile::TempDir, autosave_interval: u64) -> LiveConfig {
        LiveConfig {
            autosave_interval,
            autosave_path: dir.path().join("analytics.csv"),
            jpeg_quality: 80,
            channel_capacity: 4,
        }
    }

    #[tokio::test]
    async fn test_streams_all_frames_then_closes() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalyticsStore::new(100);
        let gate = SessionGate::new();

        let session = LiveSession::start(
            StaticFrames::new(3),
            Arc::new(OnePersonAdapter),
            store.clone(),
            test_config(&dir, 0),
            gate.try_acquire().unwrap(),
        );
        let mut stream = session.into_stream();

        let mut jpegs = 0;
        while let Some(item) = stream.next().await {
            let bytes = item.unwrap();
            assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
            jpegs += 1;
        }

        assert_eq!(jpegs, 3);
        assert_eq!(store.len(), 3);
        let snapshot = store.snapshot(None);
        assert_eq!(snapshot[0].per_class_counts.get("person"), Some(&1));
        assert!(snapshot[0].classes_available);
    }

    #[tokio::test]
    async fn test_adapter_failure_yields_one_error_then_closes() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalyticsStore::new(100);
        let gate = SessionGate::new();

        let session = LiveSession::start(
            StaticFrames::new(3),
            Arc::new(FailingAdapter),
            store.clone(),
            test_config(&dir, 0),
            gate.try_acquire().unwrap(),
        );
        let mut stream = session.into_stream();

        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
        // The failed frame appends nothing
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_source_failure_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalyticsStore::new(100);
        let gate = SessionGate::new();

        let session = LiveSession::start(
            BrokenPipe { served: 0 },
            Arc::new(OnePersonAdapter),
            store.clone(),
            test_config(&dir, 0),
            gate.try_acquire().unwrap(),
        );
        let mut stream = session.into_stream();

        assert!(stream.next().await.unwrap().is_ok());
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_autosave_written_at_interval() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalyticsStore::new(100);
        let gate = SessionGate::new();
        let config = test_config(&dir, 2);
        let path = config.autosave_path.clone();

        let session = LiveSession::start(
            StaticFrames::new(4),
            Arc::new(OnePersonAdapter),
            store.clone(),
            config,
            gate.try_acquire().unwrap(),
        );
        let mut stream = session.into_stream();
        while stream.next().await.is_some() {}

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        // Header plus all four records from the save at ordinal 4
        assert_eq!(contents.lines().count(), 5);
    }

    #[tokio::test]
    async fn test_dropping_stream_stops_producer_and_releases_gate() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalyticsStore::new(10_000);
        let gate = SessionGate::new();

        let session = LiveSession::start(
            EndlessFrames,
            Arc::new(OnePersonAdapter),
            store.clone(),
            test_config(&dir, 0),
            gate.try_acquire().unwrap(),
        );
        let mut stream = session.into_stream();

        assert!(stream.next().await.unwrap().is_ok());
        drop(stream);

        // Producer notices the closed channel and drops its permit
        for _ in 0..200 {
            if !gate.is_busy() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("gate still busy after stream was dropped");
    }
}
