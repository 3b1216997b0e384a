use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use super::{FileStore, StorageError, validate_name};

/// File store rooted at a single local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if it does not exist yet. Idempotent.
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a name to its on-disk path, validating it first.
    pub fn path_of(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, name: &str, bytes: Bytes) -> Result<(), StorageError> {
        let path = self.path_of(name)?;
        tokio::fs::write(&path, &bytes).await?;
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = self.path_of(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound { name: name.to_string() }),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            // Subdirectories placed in the root out of band are not storage keys
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.path_of(name)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalFileStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = LocalFileStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let (_dir, store) = store();

        store.put("a.wav", Bytes::from_static(b"RIFF0000")).await.unwrap();
        let bytes = store.get("a.wav").await.unwrap();

        assert_eq!(bytes, Bytes::from_static(b"RIFF0000"));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_dir, store) = store();

        store.put("a.wav", Bytes::from_static(b"first")).await.unwrap();
        store.put("a.wav", Bytes::from_static(b"second")).await.unwrap();

        assert_eq!(store.get("a.wav").await.unwrap(), Bytes::from_static(b"second"));
        assert_eq!(store.list().await.unwrap(), vec!["a.wav".to_string()]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, store) = store();

        let err = store.get("missing.wav").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_excludes_subdirectories() {
        let (dir, store) = store();

        store.put("a.wav", Bytes::from_static(b"x")).await.unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let names = store.list().await.unwrap();
        assert_eq!(names, vec!["a.wav".to_string()]);
    }

    #[tokio::test]
    async fn test_exists() {
        let (_dir, store) = store();

        assert!(!store.exists("a.wav").await.unwrap());
        store.put("a.wav", Bytes::from_static(b"x")).await.unwrap();
        assert!(store.exists("a.wav").await.unwrap());
    }

    #[tokio::test]
    async fn test_traversal_names_rejected() {
        let (_dir, store) = store();

        let err = store.put("../escape.wav", Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName { .. }));

        let err = store.get("../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName { .. }));
    }

    #[tokio::test]
    async fn test_ensure_root_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().join("nested").join("uploads"));

        store.ensure_root().await.unwrap();
        store.ensure_root().await.unwrap();

        assert!(store.root().is_dir());
        assert!(store.list().await.unwrap().is_empty());
    }
}
