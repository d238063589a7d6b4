//! Video codec adapter: WebM (VP9/Opus) transcoding via an external ffmpeg
//! process.
//!
//! The adapter materializes input to a temporary file, runs ffmpeg
//! synchronously, and reads the output file back. Both temp files are
//! dropped on every exit path.

use std::process::Stdio;
use tokio::process::Command;

/// Cap on the stderr excerpt carried in error messages.
const STDERR_EXCERPT_BYTES: usize = 2048;

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("empty video payload")]
    EmptyInput,

    #[error("invalid transcoder path: contains shell metacharacters")]
    InvalidBinaryPath,

    #[error("io error during transcode: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcoder failed: {0}")]
    Transcode(String),

    #[error("transcoder produced no output")]
    EmptyOutput,
}

/// Transcodes a single video to WebM through ffmpeg.
pub struct VideoTranscoder {
    ffmpeg_path: String,
}

impl VideoTranscoder {
    pub fn new(ffmpeg_path: String) -> Result<Self, VideoError> {
        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(VideoError::InvalidBinaryPath);
        }
        Ok(Self { ffmpeg_path })
    }

    /// Transcode `data` to WebM: VP9 video at a 1 Mbps target, Opus audio.
    ///
    /// Blocks the calling task for the duration of the ffmpeg run. One file
    /// per call; there is no batch video path.
    pub async fn convert_to_webm(&self, data: &[u8]) -> Result<Vec<u8>, VideoError> {
        if data.is_empty() {
            return Err(VideoError::EmptyInput);
        }

        // NamedTempFile removes the file on drop, covering early returns too.
        let input = tempfile::Builder::new().suffix(".mp4").tempfile()?;
        let output = tempfile::Builder::new().suffix(".webm").tempfile()?;

        tokio::fs::write(input.path(), data).await?;

        let result = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input.path())
            .args(["-c:v", "libvpx-vp9", "-b:v", "1M", "-c:a", "libopus", "-f", "webm", "-y"])
            .arg(output.path())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let excerpt = stderr
                .get(stderr.len().saturating_sub(STDERR_EXCERPT_BYTES)..)
                .unwrap_or(&stderr)
                .trim()
                .to_string();
            tracing::warn!(status = ?result.status.code(), "ffmpeg exited with failure");
            return Err(VideoError::Transcode(excerpt));
        }

        let transcoded = tokio::fs::read(output.path()).await?;
        if transcoded.is_empty() {
            return Err(VideoError::EmptyOutput);
        }

        tracing::debug!(
            input_bytes = data.len(),
            output_bytes = transcoded.len(),
            "Video transcoded to WebM"
        );
        Ok(transcoded)
    }
}
