use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for cutting a clip out of an uploaded file.
///
/// Time offsets are fractional seconds from the start of the source; both
/// must be non-negative finite numbers. Whether the range fits the source's
/// duration is decided by the trim tool.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TrimRequest {
    /// Name of a previously uploaded source file
    pub filename: String,
    /// Clip start, in seconds
    pub start: f64,
    /// Clip end, in seconds
    pub end: f64,
    /// Base name for the output; the service appends `.mp3`
    pub output_name: String,
}

/// Response for a completed trim
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrimResponse {
    /// Name the clip was stored under, downloadable via `/download/{filename}`
    pub output_filename: String,
}
