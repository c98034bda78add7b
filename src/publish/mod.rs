// ABOUTME: Uploads extracted artifact files to the deploy target.
// ABOUTME: Assets go first and HTML pages last, so pages never reference missing files.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::history::{DeploymentRecord, RecordError};
use crate::storage::{ObjectStorage, StorageError};
use crate::types::ObjectLocation;

/// Errors from publishing an extracted artifact.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("file path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to upload {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("invalid deployment record: {0}")]
    Record(#[from] RecordError),
}

/// A file found in the extraction directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Path relative to the extraction directory, `/`-separated.
    pub relative: String,
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Destination key in the target bucket.
    pub key: String,
}

impl LocalFile {
    pub fn is_html(&self) -> bool {
        self.relative.ends_with(".html")
    }
}

/// Enumerate every regular file under `dir`, sorted by relative path.
pub fn collect_files(dir: &Path, target: &ObjectLocation) -> Result<Vec<LocalFile>, PublishError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| PublishError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .ok()
            .and_then(relative_key)
            .ok_or_else(|| PublishError::NonUtf8Path(entry.path().to_path_buf()))?;

        files.push(LocalFile {
            key: target.join_key(&relative),
            relative,
            path: entry.path().to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

fn relative_key(path: &Path) -> Option<String> {
    let parts = path
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Split files into the two upload batches: assets first, then HTML pages.
pub fn upload_order(files: Vec<LocalFile>) -> (Vec<LocalFile>, Vec<LocalFile>) {
    files.into_iter().partition(|f| !f.is_html())
}

/// Content type hint from the file extension, if one is known.
pub fn content_type_for(filename: &str) -> Option<String> {
    mime_guess::from_path(filename)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

/// Uploads extracted files into a target location.
pub struct Publisher<'a> {
    storage: &'a dyn ObjectStorage,
    target: &'a ObjectLocation,
}

impl<'a> Publisher<'a> {
    pub fn new(storage: &'a dyn ObjectStorage, target: &'a ObjectLocation) -> Self {
        Self { storage, target }
    }

    /// Upload everything under `dir` and return one record per file, all
    /// stamped with `timestamp`.
    pub async fn publish(
        &self,
        dir: &Path,
        timestamp: i64,
    ) -> Result<Vec<DeploymentRecord>, PublishError> {
        let files = collect_files(dir, self.target)?;
        let records = files
            .iter()
            .map(|f| DeploymentRecord::new(timestamp, f.relative.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let (assets, pages) = upload_order(files);
        self.upload_batch(&assets).await?;
        self.upload_batch(&pages).await?;

        Ok(records)
    }

    async fn upload_batch(&self, files: &[LocalFile]) -> Result<(), PublishError> {
        for file in files {
            tracing::info!(
                "Uploading {} to {}",
                file.path.display(),
                self.target.join(&file.relative)
            );

            let body = tokio::fs::read(&file.path)
                .await
                .map_err(|source| PublishError::Read {
                    path: file.path.clone(),
                    source,
                })?;
            let content_type = content_type_for(&file.relative);

            self.storage
                .put(
                    self.target.bucket(),
                    &file.key,
                    Bytes::from(body),
                    content_type.as_deref(),
                )
                .await
                .map_err(|source| PublishError::Upload {
                    key: file.key.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
