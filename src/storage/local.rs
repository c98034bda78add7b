// ABOUTME: Local filesystem backend for ObjectStorage.
// ABOUTME: Maps bucket/key onto root/bucket/key; used for file:// locators and dry runs.

use super::{DeleteFailure, ObjectStorage, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Filesystem-backed object storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path backing `bucket/key`.
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for part in bucket.split('/').chain(key.split('/')) {
            if !part.is_empty() && part != "." && part != ".." {
                path.push(part);
            }
        }
        path
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn failed(operation: &'static str, key: &str, err: std::io::Error) -> StorageError {
    StorageError::OperationFailed {
        operation,
        key: key.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let path = self.object_path(bucket, key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(failed("get", key, e)),
        }
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| failed("put", key, e))?;
        }
        tracing::debug!(
            "Writing {} ({})",
            path.display(),
            content_type.unwrap_or("no content type")
        );
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| failed("put", key, e))
    }

    async fn delete_many(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<DeleteFailure>, StorageError> {
        let mut failures = Vec::new();
        for key in keys {
            match tokio::fs::remove_file(self.object_path(bucket, key)).await {
                Ok(()) => {}
                // Deleting a missing object succeeds, as it does in S3.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => failures.push(DeleteFailure {
                    key: key.clone(),
                    code: Some(format!("{:?}", e.kind())),
                    message: Some(e.to_string()),
                }),
            }
        }
        Ok(failures)
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        let source = self.object_path(bucket, key);
        match tokio::fs::copy(&source, dest).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(failed("download", key, e)),
        }
    }
}
