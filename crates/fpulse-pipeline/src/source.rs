//! Frame acquisition from video sources.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use image::RgbImage;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::probe::{probe_video, VideoInfo};

/// Sequential frame supplier. `Ok(None)` signals a clean end of stream.
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> PipelineResult<Option<RgbImage>>;
}

/// Frames decoded from a video file through an ffmpeg rawvideo pipe.
///
/// The decoder child is killed on drop, so the source is released on every
/// exit path, client disconnects included.
pub struct VideoFrameSource {
    child: Child,
    stdout: BufReader<ChildStdout>,
    width: u32,
    height: u32,
    frame_len: usize,
    info: VideoInfo,
}

impl VideoFrameSource {
    /// Probe the input and spawn the decoder.
    ///
    /// With `realtime_pacing` the decoder reads input at its native frame
    /// rate (`-re`), matching live playback; otherwise frames arrive as fast
    /// as they decode.
    pub async fn open(path: impl AsRef<Path>, realtime_pacing: bool) -> PipelineResult<Self> {
        let path = path.as_ref();

        which::which("ffmpeg").map_err(|_| PipelineError::FfmpegNotFound)?;

        let info = probe_video(path).await?;
        if info.width == 0 || info.height == 0 {
            return Err(PipelineError::invalid_video(
                "video stream reports zero dimensions",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        if realtime_pacing {
            cmd.arg("-re");
        }
        cmd.arg("-i")
            .arg(path)
            .args(["-pix_fmt", "rgb24", "-f", "rawvideo", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = cmd
            .spawn()
            .map_err(|e| PipelineError::frame_pipe(format!("failed to spawn ffmpeg: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PipelineError::frame_pipe("failed to capture ffmpeg stdout"))?;

        info!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            duration = info.duration,
            realtime_pacing,
            "video frame source opened"
        );

        Ok(Self {
            stdout: BufReader::new(stdout),
            frame_len: (info.width * info.height * 3) as usize,
            width: info.width,
            height: info.height,
            child,
            info,
        })
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }
}

#[async_trait]
impl FrameSource for VideoFrameSource {
    async fn next_frame(&mut self) -> PipelineResult<Option<RgbImage>> {
        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0usize;

        // EOF at a frame boundary is a clean end of stream; mid-frame EOF is
        // a truncated pipe.
        while filled < self.frame_len {
            let n = self
                .stdout
                .read(&mut buf[filled..])
                .await
                .map_err(|e| PipelineError::frame_pipe(format!("failed to read ffmpeg output: {}", e)))?;

            if n == 0 {
                if filled == 0 {
                    let status = self.child.wait().await?;
                    debug!(exit = ?status.code(), "ffmpeg decoder finished");
                    return Ok(None);
                }
                return Err(PipelineError::frame_pipe(format!(
                    "truncated frame: got {} of {} bytes",
                    filled, self.frame_len
                )));
            }
            filled += n;
        }

        let frame = RgbImage::from_raw(self.width, self.height, buf)
            .ok_or_else(|| PipelineError::frame_pipe("frame buffer size mismatch"))?;
        Ok(Some(frame))
    }
}

impl Drop for VideoFrameSource {
    fn drop(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!(error = %e, "ffmpeg decoder already exited");
        }
    }
}
