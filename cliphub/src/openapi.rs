//! OpenAPI documentation assembled from handler annotations.

use utoipa::OpenApi;

use crate::api::models::clips::{TrimRequest, TrimResponse};
use crate::api::models::files::UploadResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "cliphub API",
        description = "Upload audio files, cut time ranges out of them without re-encoding, and download the results."
    ),
    paths(
        crate::api::handlers::files::upload_file,
        crate::api::handlers::files::list_files,
        crate::api::handlers::files::serve_upload,
        crate::api::handlers::clips::trim_file,
        crate::api::handlers::clips::download_clip,
    ),
    components(schemas(UploadResponse, TrimRequest, TrimResponse)),
    tags(
        (name = "files", description = "Uploaded source files"),
        (name = "clips", description = "Trimmed clip outputs")
    )
)]
pub struct ApiDoc;
