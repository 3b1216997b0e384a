use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Semaphore;

use super::{ClipRange, Clipper, TrimError};
use crate::storage::validate_name;

/// Stderr bytes kept for diagnostics. ffmpeg front-loads banner noise; the
/// useful part is at the end.
const STDERR_TAIL_BYTES: usize = 4096;

/// [`Clipper`] backed by the system `ffmpeg` binary.
///
/// Each trim spawns one child process and waits for it to finish. A semaphore
/// caps how many children run at once, so a burst of trim requests queues
/// instead of forking without bound.
pub struct FfmpegClipper {
    ffmpeg_path: String,
    uploads_root: PathBuf,
    clips_root: PathBuf,
    permits: Semaphore,
}

impl FfmpegClipper {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        uploads_root: impl Into<PathBuf>,
        clips_root: impl Into<PathBuf>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            uploads_root: uploads_root.into(),
            clips_root: clips_root.into(),
            permits: Semaphore::new(max_concurrent),
        }
    }
}

#[async_trait]
impl Clipper for FfmpegClipper {
    async fn trim(&self, source_name: &str, range: ClipRange, dest_name: &str) -> Result<(), TrimError> {
        validate_name(source_name)?;
        validate_name(dest_name)?;

        let source = self.uploads_root.join(source_name);
        let dest = self.clips_root.join(dest_name);

        // Queue here when max_concurrent children are already running
        let _permit = self.permits.acquire().await.expect("clipper semaphore closed");

        tracing::debug!(
            tool = %self.ffmpeg_path,
            source = %source.display(),
            dest = %dest.display(),
            start_secs = range.start_secs(),
            end_secs = range.end_secs(),
            "spawning trim process"
        );

        let output = Command::new(&self.ffmpeg_path)
            .arg("-nostdin")
            .arg("-i")
            .arg(&source)
            .arg("-ss")
            .arg(range.start_secs().to_string())
            .arg("-to")
            .arg(range.end_secs().to_string())
            .args(["-c", "copy"])
            .arg("-y")
            .arg(&dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| TrimError::Spawn {
                tool: self.ffmpeg_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TrimError::Tool {
                tool: self.ffmpeg_path.clone(),
                status: output.status,
                stderr: stderr_tail(&output.stderr),
            });
        }

        tracing::info!(
            source = source_name,
            dest = dest_name,
            start_secs = range.start_secs(),
            end_secs = range.end_secs(),
            "trim completed"
        );

        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let tail_start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[tail_start..]).into_owned()
}
