use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use super::{FileStore, StorageError, validate_name};

/// In-memory file store, a drop-in test double for [`super::LocalFileStore`].
///
/// Enforces the same name validation so tests exercise the real contract.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: RwLock<HashMap<String, Bytes>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn put(&self, name: &str, bytes: Bytes) -> Result<(), StorageError> {
        validate_name(name)?;
        self.files
            .write()
            .expect("file table lock poisoned")
            .insert(name.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
        validate_name(name)?;
        self.files
            .read()
            .expect("file table lock poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { name: name.to_string() })
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self
            .files
            .read()
            .expect("file table lock poisoned")
            .keys()
            .cloned()
            .collect())
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        validate_name(name)?;
        Ok(self.files.read().expect("file table lock poisoned").contains_key(name))
    }
}
