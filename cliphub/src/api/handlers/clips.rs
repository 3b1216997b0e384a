//! Handlers for trimmed clips: cutting and serving.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use crate::AppState;
use crate::api::handlers::files::serve_file;
use crate::api::models::clips::{TrimRequest, TrimResponse};
use crate::clip::{ClipRange, Clipper};
use crate::errors::{Error, Result};
use crate::storage::{FileStore, validate_name};

#[utoipa::path(
    post,
    path = "/trim",
    tag = "clips",
    summary = "Trim a clip",
    description = "Cut the `[start, end)` range out of an uploaded file into a new `.mp3` clip, \
                   copying the encoded stream without re-encoding.",
    request_body = TrimRequest,
    responses(
        (status = 200, description = "Clip created", body = TrimResponse),
        (status = 400, description = "Invalid file name, output name, or time range"),
        (status = 404, description = "Source file was never uploaded"),
        (status = 502, description = "Trim tool failed"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn trim_file(State(state): State<AppState>, Json(request): Json<TrimRequest>) -> Result<Json<TrimResponse>> {
    let range = ClipRange::new(request.start, request.end)?;

    validate_name(&request.filename)?;
    validate_name(&request.output_name)?;
    if request.output_name.contains('.') {
        return Err(Error::BadRequest {
            message: "output_name must not contain '.': the service appends the extension".to_string(),
        });
    }

    // The tool would fail on a missing source anyway, but with a diagnostic
    // that points at a path instead of the caller's mistake
    if !state.uploads.exists(&request.filename).await? {
        return Err(Error::NotFound {
            resource: "Upload".to_string(),
            name: request.filename.clone(),
        });
    }

    let output_filename = format!("{}.mp3", request.output_name);
    state.clipper.trim(&request.filename, range, &output_filename).await?;

    tracing::info!(source = %request.filename, output = %output_filename, "clip created");

    Ok(Json(TrimResponse { output_filename }))
}

#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "clips",
    summary = "Download clip",
    description = "Stream back a previously trimmed clip.",
    params(
        ("filename" = String, Path, description = "Full clip name, e.g. `clip.mp3`")
    ),
    responses(
        (status = 200, description = "Clip contents"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "No such clip")
    )
)]
pub async fn download_clip(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Response> {
    serve_file(state.clips.as_ref(), &filename).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use bytes::Bytes;
    use serde_json::json;

    use crate::storage::{FileStore, MemoryFileStore};
    use crate::test_utils::{StubClipper, test_router, test_router_with_clipper};

    async fn server_with_upload() -> (TestServer, Arc<MemoryFileStore>) {
        let uploads = Arc::new(MemoryFileStore::new());
        uploads.put("song.wav", Bytes::from_static(b"RIFF fake audio")).await.unwrap();
        let clips = Arc::new(MemoryFileStore::new());
        let server = TestServer::new(test_router(uploads.clone(), clips.clone())).unwrap();
        (server, clips)
    }

    #[tokio::test]
    async fn test_trim_happy_path() {
        let (server, clips) = server_with_upload().await;

        let response = server
            .post("/trim")
            .json(&json!({"filename": "song.wav", "start": 0.0, "end": 1.5, "output_name": "clip"}))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"output_filename": "clip.mp3"}));
        assert!(clips.exists("clip.mp3").await.unwrap());
    }

    #[tokio::test]
    async fn test_trim_missing_source_is_not_found() {
        let (server, _clips) = server_with_upload().await;

        let response = server
            .post("/trim")
            .json(&json!({"filename": "never-uploaded.wav", "start": 0.0, "end": 1.0, "output_name": "clip"}))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_trim_rejects_bad_output_name() {
        let (server, _clips) = server_with_upload().await;

        for output_name in ["clip.mp3", "../clip", ""] {
            let response = server
                .post("/trim")
                .json(&json!({"filename": "song.wav", "start": 0.0, "end": 1.0, "output_name": output_name}))
                .await;

            response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_trim_rejects_negative_start() {
        let (server, _clips) = server_with_upload().await;

        let response = server
            .post("/trim")
            .json(&json!({"filename": "song.wav", "start": -1.0, "end": 1.0, "output_name": "clip"}))
            .await;

        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tool_failure_is_a_server_error_not_false_success() {
        let uploads = Arc::new(MemoryFileStore::new());
        uploads.put("song.wav", Bytes::from_static(b"x")).await.unwrap();
        let clips = Arc::new(MemoryFileStore::new());
        let clipper = Arc::new(StubClipper::failing(clips.clone(), "no such tool"));
        let server = TestServer::new(test_router_with_clipper(uploads, clips.clone(), clipper)).unwrap();

        let response = server
            .post("/trim")
            .json(&json!({"filename": "song.wav", "start": 0.0, "end": 1.0, "output_name": "clip"}))
            .await;

        response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!clips.exists("clip.mp3").await.unwrap());
    }

    #[tokio::test]
    async fn test_download_clip_roundtrip() {
        let clips = Arc::new(MemoryFileStore::new());
        clips.put("clip.mp3", Bytes::from_static(b"clipped bytes")).await.unwrap();
        let server = TestServer::new(test_router(Arc::new(MemoryFileStore::new()), clips)).unwrap();

        let response = server.get("/download/clip.mp3").await;

        response.assert_status_ok();
        assert_eq!(response.as_bytes().as_ref(), b"clipped bytes".as_slice());
    }

    #[tokio::test]
    async fn test_download_missing_clip_is_not_found() {
        let server = TestServer::new(test_router(Arc::new(MemoryFileStore::new()), Arc::new(MemoryFileStore::new()))).unwrap();

        let response = server.get("/download/never-made.mp3").await;

        response.assert_status_not_found();
    }
}
