//! Flat-file storage over named directory roots.
//!
//! The service keeps two independent areas: one for caller-uploaded originals
//! and one for trimmed clip outputs. Both are plain directories where the
//! file name is the only index - no manifest, no database. The [`FileStore`]
//! trait abstracts the backing store so handlers can be exercised against an
//! in-memory fake, and [`validate_name`] is the single gate every
//! caller-supplied name must pass before it is used as a storage key.

mod local;
mod memory;

pub use local::LocalFileStore;
pub use memory::MemoryFileStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Longest accepted file name, in bytes. Matches common filesystem limits.
pub const MAX_NAME_BYTES: usize = 255;

#[derive(Error, Debug)]
pub enum StorageError {
    /// Caller-supplied name failed validation
    #[error("invalid file name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// No file stored under this name
    #[error("file '{name}' not found")]
    NotFound { name: String },

    /// Underlying filesystem failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Validate a caller-supplied file name before it touches the filesystem.
///
/// Names are used verbatim as storage keys, so anything that could escape the
/// storage root or confuse directory enumeration is rejected outright.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let invalid = |reason: &'static str| StorageError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(invalid("name is too long"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name is a directory reference"));
    }
    if name.starts_with('.') {
        return Err(invalid("hidden names are not allowed"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("path separators are not allowed"));
    }
    if name.contains('\0') {
        return Err(invalid("NUL bytes are not allowed"));
    }

    Ok(())
}

/// A flat namespace of files keyed by validated name.
///
/// Writes overwrite silently (last write wins); nothing is ever deleted.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` under `name`, replacing any existing file of that name.
    async fn put(&self, name: &str, bytes: Bytes) -> Result<(), StorageError>;

    /// Read the full contents of the file stored under `name`.
    async fn get(&self, name: &str) -> Result<Bytes, StorageError>;

    /// Names of all stored files. Regular files only, unordered.
    async fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Whether a file is stored under `name`.
    async fn exists(&self, name: &str) -> Result<bool, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts_ordinary_names() {
        for name in ["a.wav", "recording-01.mp3", "Track 7 (final).flac", "voice_memo"] {
            assert!(validate_name(name).is_ok(), "expected {name:?} to be accepted");
        }
    }

    #[test]
    fn test_validate_name_rejects_escapes() {
        for name in [
            "",
            ".",
            "..",
            ".hidden",
            "../../etc/passwd",
            "a/b.wav",
            "a\\b.wav",
            "nul\0byte",
        ] {
            assert!(
                matches!(validate_name(name), Err(StorageError::InvalidName { .. })),
                "expected {name:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_validate_name_rejects_oversized_names() {
        let name = "a".repeat(MAX_NAME_BYTES + 1);
        assert!(matches!(validate_name(&name), Err(StorageError::InvalidName { .. })));

        let name = "a".repeat(MAX_NAME_BYTES);
        assert!(validate_name(&name).is_ok());
    }
}
