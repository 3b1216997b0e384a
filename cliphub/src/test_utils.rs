//! Shared constructors for handler tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;

use crate::clip::{ClipRange, Clipper, TrimError};
use crate::storage::{FileStore, MemoryFileStore};
use crate::{AppState, Config, build_router};

/// Clipper double that "trims" by writing a fixed payload into the clips
/// store, or fails without touching it.
pub(crate) struct StubClipper {
    clips: Arc<MemoryFileStore>,
    failure: Option<&'static str>,
}

impl StubClipper {
    pub(crate) fn succeeding(clips: Arc<MemoryFileStore>) -> Self {
        Self { clips, failure: None }
    }

    pub(crate) fn failing(clips: Arc<MemoryFileStore>, message: &'static str) -> Self {
        Self {
            clips,
            failure: Some(message),
        }
    }
}

#[async_trait]
impl Clipper for StubClipper {
    async fn trim(&self, _source_name: &str, _range: ClipRange, dest_name: &str) -> Result<(), TrimError> {
        if let Some(message) = self.failure {
            return Err(TrimError::Spawn {
                tool: "ffmpeg".to_string(),
                source: std::io::Error::other(message),
            });
        }
        self.clips.put(dest_name, Bytes::from_static(b"clipped bytes")).await?;
        Ok(())
    }
}

pub(crate) fn test_router_with_clipper(
    uploads: Arc<MemoryFileStore>,
    clips: Arc<MemoryFileStore>,
    clipper: Arc<dyn Clipper>,
) -> Router {
    let state = AppState::builder()
        .config(Config::default())
        .uploads(uploads as Arc<dyn FileStore>)
        .clips(clips as Arc<dyn FileStore>)
        .clipper(clipper)
        .build();
    build_router(state).expect("Failed to build router")
}

pub(crate) fn test_router(uploads: Arc<MemoryFileStore>, clips: Arc<MemoryFileStore>) -> Router {
    let clipper = Arc::new(StubClipper::succeeding(clips.clone()));
    test_router_with_clipper(uploads, clips, clipper)
}
