use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

use crate::clip::TrimError;
use crate::storage::StorageError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data (malformed multipart, bad file name, bad time range)
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested file not found
    #[error("{resource} '{name}' not found")]
    NotFound { resource: String, name: String },

    /// Storage backend error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// External trim tool error
    #[error(transparent)]
    Trim(#[from] TrimError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Storage(storage_err) => match storage_err {
                StorageError::InvalidName { .. } => StatusCode::BAD_REQUEST,
                StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
                StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Trim(trim_err) => match trim_err {
                TrimError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
                TrimError::Storage(StorageError::InvalidName { .. }) => StatusCode::BAD_REQUEST,
                TrimError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                TrimError::Tool { .. } => StatusCode::BAD_GATEWAY,
                TrimError::Spawn { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, name } => format!("{resource} '{name}' not found"),
            Error::Storage(storage_err) => match storage_err {
                StorageError::InvalidName { name, reason } => format!("Invalid file name {name:?}: {reason}"),
                StorageError::NotFound { name } => format!("File '{name}' not found"),
                StorageError::Io(_) => "Internal server error".to_string(),
            },
            Error::Trim(trim_err) => match trim_err {
                TrimError::InvalidRange { reason } => format!("Invalid time range: {reason}"),
                TrimError::Storage(StorageError::InvalidName { name, reason }) => {
                    format!("Invalid file name {name:?}: {reason}")
                }
                TrimError::Storage(_) => "Internal server error".to_string(),
                TrimError::Tool { tool, status, .. } => format!("{tool} exited with {status}"),
                TrimError::Spawn { tool, .. } => format!("Failed to launch {tool}"),
            },
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Storage(StorageError::Io(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Trim(TrimError::Tool { stderr, .. }) => {
                tracing::error!(stderr = %stderr, "Trim tool failed: {}", self);
            }
            Error::Trim(TrimError::Spawn { .. }) => {
                tracing::error!("Trim tool could not be started: {:#}", self);
            }
            Error::Trim(_) => {
                tracing::debug!("Trim request rejected: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Storage(_) => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        // Trim tool failures carry structured diagnostic detail for the caller
        if let Error::Trim(TrimError::Tool { tool, status: exit, stderr }) = &self {
            use serde_json::json;
            let body = json!({
                "message": format!("{tool} exited with {exit}"),
                "detail": last_stderr_line(stderr),
            });
            return (status, axum::response::Json(body)).into_response();
        }

        // For all other errors, return a simple text message
        let user_message = self.user_message();
        (status, user_message).into_response()
    }
}

/// The last non-empty stderr line is where ffmpeg puts the actual diagnosis.
fn last_stderr_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let bad_request = Error::BadRequest {
            message: "nope".to_string(),
        };
        assert_eq!(bad_request.status_code(), StatusCode::BAD_REQUEST);

        let not_found = Error::NotFound {
            resource: "Upload".to_string(),
            name: "a.wav".to_string(),
        };
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let invalid_name = Error::Storage(StorageError::InvalidName {
            name: "../etc/passwd".to_string(),
            reason: "path separators are not allowed",
        });
        assert_eq!(invalid_name.status_code(), StatusCode::BAD_REQUEST);

        let invalid_range = Error::Trim(TrimError::InvalidRange {
            reason: "start must be finite",
        });
        assert_eq!(invalid_range.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_user_message_hides_io_detail() {
        let io_err = Error::Storage(StorageError::Io(std::io::Error::other("disk exploded at /secret/path")));
        assert_eq!(io_err.user_message(), "Internal server error");
    }

    #[test]
    fn test_last_stderr_line_picks_diagnosis() {
        let stderr = "ffmpeg version 6.0\nStream mapping:\nInvalid data found when processing input\n\n";
        assert_eq!(last_stderr_line(stderr), "Invalid data found when processing input");
    }
}
