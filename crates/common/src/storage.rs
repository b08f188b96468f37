//! Local filesystem storage for uploaded files.

use std::path::PathBuf;

use crate::{AppError, AppResult};

/// Metadata of a file written to storage.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Storage key (path relative to the storage root).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write a file under `key`, creating parent directories.
    async fn put(&self, key: &str, data: &[u8]) -> AppResult<StoredFile>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn put(&self, key: &str, data: &[u8]) -> AppResult<StoredFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        tracing::debug!(key = %key, size = data.len(), "Stored file");

        Ok(StoredFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("inkwell-storage-{}", uuid::Uuid::new_v4().simple()))
    }

    #[test]
    fn test_public_url_trims_slash() {
        let storage = LocalStorage::new(PathBuf::from("./uploads"), "/uploads/".to_string());
        assert_eq!(storage.public_url("a/b/c.png"), "/uploads/a/b/c.png");
    }

    #[tokio::test]
    async fn test_put_creates_directories() {
        let root = temp_root();
        let storage = LocalStorage::new(root.clone(), "/uploads".to_string());

        let stored = storage.put("images/avatars/x.png", b"abc").await.unwrap();

        assert_eq!(stored.size, 3);
        assert_eq!(stored.url, "/uploads/images/avatars/x.png");
        let written = tokio::fs::read(root.join("images/avatars/x.png")).await.unwrap();
        assert_eq!(written, b"abc");

        tokio::fs::remove_dir_all(root).await.unwrap();
    }
}
