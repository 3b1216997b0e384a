//! Clip extraction via an external media tool.
//!
//! The [`Clipper`] trait is the capability seam between the HTTP layer and
//! the tool that actually cuts media: handlers hand it validated names and a
//! time range, and get back a `Result` that reflects what the tool really
//! did - exit status and stderr included. [`FfmpegClipper`] is the production
//! implementation over the system `ffmpeg` binary.

mod ffmpeg;

pub use ffmpeg::FfmpegClipper;

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::StorageError;

/// Time range of a clip, in fractional seconds from the start of the source.
///
/// The accepted grammar is a pair of non-negative finite numbers. Whether the
/// range is satisfiable for a given source (within its duration, start before
/// end) is left to the tool, whose failure is surfaced as [`TrimError::Tool`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRange {
    start_secs: f64,
    end_secs: f64,
}

impl ClipRange {
    pub fn new(start_secs: f64, end_secs: f64) -> Result<Self, TrimError> {
        if !start_secs.is_finite() {
            return Err(TrimError::InvalidRange {
                reason: "start must be a finite number of seconds",
            });
        }
        if !end_secs.is_finite() {
            return Err(TrimError::InvalidRange {
                reason: "end must be a finite number of seconds",
            });
        }
        if start_secs < 0.0 {
            return Err(TrimError::InvalidRange {
                reason: "start must not be negative",
            });
        }
        if end_secs < 0.0 {
            return Err(TrimError::InvalidRange {
                reason: "end must not be negative",
            });
        }

        Ok(Self { start_secs, end_secs })
    }

    pub fn start_secs(&self) -> f64 {
        self.start_secs
    }

    pub fn end_secs(&self) -> f64 {
        self.end_secs
    }
}

#[derive(Error, Debug)]
pub enum TrimError {
    /// Offsets outside the accepted grammar (non-negative finite seconds)
    #[error("invalid time range: {reason}")]
    InvalidRange { reason: &'static str },

    /// Source or destination name failed validation
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The tool binary could not be started
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited non-zero
    #[error("{tool} exited with {status}")]
    Tool {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Capability to cut the `[start, end)` range of a stored source into a new
/// output file without re-encoding.
#[async_trait]
pub trait Clipper: Send + Sync {
    /// Produce `dest_name` in the clips area from the given range of
    /// `source_name` in the uploads area. An existing output of the same
    /// name is overwritten.
    async fn trim(&self, source_name: &str, range: ClipRange, dest_name: &str) -> Result<(), TrimError>;
}
