use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for a stored upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Name the file was stored under, as supplied by the caller
    pub filename: String,
}
