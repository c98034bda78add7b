// ABOUTME: Object storage abstraction used by the deploy pipeline.
// ABOUTME: Defines ObjectStorage plus S3 and local filesystem backends.

mod local;
mod s3;

pub use local::LocalStorage;
pub use s3::S3Storage;

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::types::Scheme;

/// Object storage operations the deploy pipeline needs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fetch an object's contents.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    /// Create or overwrite an object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Delete a batch of objects.
    ///
    /// Returns the keys that could not be deleted. An `Err` means the request
    /// as a whole failed.
    async fn delete_many(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<DeleteFailure>, StorageError>;

    /// Download an object into a local file.
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        let body = self.get(bucket, key).await?;
        tokio::fs::write(dest, &body)
            .await
            .map_err(|e| StorageError::OperationFailed {
                operation: "download",
                key: key.to_string(),
                message: format!("failed to write {}: {}", dest.display(), e),
            })
    }
}

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("storage {operation} failed for {key}: {message}")]
    OperationFailed {
        operation: &'static str,
        key: String,
        message: String,
    },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// A key that a batch delete could not remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub key: String,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl std::fmt::Display for DeleteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)?;
        if let Some(code) = &self.code {
            write!(f, " ({code})")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Concrete backend selected from the target locator's scheme.
pub enum StorageBackend {
    S3(S3Storage),
    Local(LocalStorage),
}

impl StorageBackend {
    /// Build the backend for `scheme`. S3 clients load credentials from the environment.
    pub async fn for_scheme(scheme: Scheme) -> Self {
        match scheme {
            Scheme::S3 => {
                let sdk_config = aws_config::load_from_env().await;
                StorageBackend::S3(S3Storage::new(&sdk_config))
            }
            Scheme::File => StorageBackend::Local(LocalStorage::new("/")),
        }
    }

    fn inner(&self) -> &dyn ObjectStorage {
        match self {
            StorageBackend::S3(s3) => s3,
            StorageBackend::Local(local) => local,
        }
    }
}

#[async_trait]
impl ObjectStorage for StorageBackend {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        self.inner().get(bucket, key).await
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.inner().put(bucket, key, body, content_type).await
    }

    async fn delete_many(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<DeleteFailure>, StorageError> {
        self.inner().delete_many(bucket, keys).await
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        self.inner().download(bucket, key, dest).await
    }
}
