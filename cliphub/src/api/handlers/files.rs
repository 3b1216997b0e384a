//! Handlers for uploaded source files: upload, listing, and serving.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::api::models::files::UploadResponse;
use crate::errors::{Error, Result};
use crate::storage::FileStore;

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    summary = "Upload file",
    description = "Store an audio file under its client-supplied name. A second upload with the same name overwrites the first.",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with the audio data in a `file` field"
    ),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing file part or invalid file name"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Result<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        if field.name() != Some("file") {
            // Ignore unknown fields (forward compatibility)
            continue;
        }

        let filename = field.file_name().map(|s| s.to_string()).ok_or_else(|| Error::BadRequest {
            message: "File part has no filename".to_string(),
        })?;

        let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read file data: {e}"),
        })?;

        let size_bytes = bytes.len();
        state.uploads.put(&filename, bytes).await?;

        tracing::info!(filename = %filename, size_bytes, "stored uploaded file");
        return Ok((StatusCode::CREATED, Json(UploadResponse { filename })));
    }

    Err(Error::BadRequest {
        message: "Missing required field: 'file'".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    summary = "List uploaded files",
    description = "Names of all uploaded files. Unordered; subdirectories in the storage root are not included.",
    responses(
        (status = 200, description = "List of filenames", body = Vec<String>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let names = state.uploads.list().await?;
    Ok(Json(names))
}

#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    tag = "files",
    summary = "Download original",
    description = "Stream back an uploaded file exactly as stored.",
    params(
        ("filename" = String, Path, description = "Name the file was uploaded under")
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "No such file")
    )
)]
pub async fn serve_upload(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Response> {
    serve_file(state.uploads.as_ref(), &filename).await
}

/// Respond with a stored file's bytes, content type guessed from the name.
pub(crate) async fn serve_file(store: &dyn FileStore, filename: &str) -> Result<Response> {
    let bytes = store.get(filename).await?;
    let mime = mime_guess::from_path(filename).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.as_ref())], bytes).into_response())
}
