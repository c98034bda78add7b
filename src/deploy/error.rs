// ABOUTME: Error types for deployment runs with SNAFU context selectors.
// ABOUTME: Every failure records the stage it aborted so callers can report it.

use snafu::Snafu;
use std::fmt;

use crate::archive::ArchiveError;
use crate::cdn::InvalidationError;
use crate::history::LogCodecError;
use crate::publish::PublishError;
use crate::storage::StorageError;
use crate::types::{DistributionId, ObjectLocation};

/// Steps of a deployment run that can fail, in execution order.
///
/// Reconciling is pure and cannot fail, so it has no stage here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingLog,
    Publishing,
    PersistingLog,
    Invalidating,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchingLog => "fetching deployment log",
            Stage::Publishing => "publishing artifact",
            Stage::PersistingLog => "persisting deployment log",
            Stage::Invalidating => "invalidating CDN cache",
        };
        f.write_str(name)
    }
}

/// Errors that abort a deployment run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DeployError {
    #[snafu(display("failed to fetch deployment log {location}: {source}"))]
    FetchLog {
        location: ObjectLocation,
        source: StorageError,
    },

    #[snafu(display("deployment log {location} is corrupt: {source}"))]
    DecodeLog {
        location: ObjectLocation,
        source: LogCodecError,
    },

    #[snafu(display("artifact {artifact} must use the same storage scheme as target {target}"))]
    SchemeMismatch {
        artifact: ObjectLocation,
        target: ObjectLocation,
    },

    #[snafu(display("failed to prepare scratch space: {source}"))]
    Scratch { source: std::io::Error },

    #[snafu(display("failed to download artifact {location}: {source}"))]
    DownloadArtifact {
        location: ObjectLocation,
        source: StorageError,
    },

    #[snafu(display("failed to extract artifact {location}: {source}"))]
    Extract {
        location: ObjectLocation,
        source: ArchiveError,
    },

    #[snafu(display("failed to publish to {location}: {source}"))]
    Publish {
        location: ObjectLocation,
        source: PublishError,
    },

    #[snafu(display("failed to store deployment log {location}: {source}"))]
    PersistLog {
        location: ObjectLocation,
        source: StorageError,
    },

    #[snafu(display("failed to delete expired files under {location}: {source}"))]
    DeleteExpired {
        location: ObjectLocation,
        source: StorageError,
    },

    #[snafu(display("no cache invalidator available for distribution {distribution}"))]
    MissingInvalidator { distribution: DistributionId },

    #[snafu(display("failed to invalidate distribution {distribution}: {source}"))]
    Invalidate {
        distribution: DistributionId,
        source: InvalidationError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// The persisted deployment log contains a corrupt line.
    MalformedLogEntry,
    /// The artifact is not a zip or gzip-tar archive.
    UnsupportedArchiveFormat,
    /// The artifact could not be unpacked.
    ArchiveFailed,
    /// A storage request failed.
    StorageOperationFailed,
    /// The CDN rejected the invalidation.
    InvalidationFailed,
    /// Locators or collaborators don't fit together.
    Configuration,
    /// Local filesystem problem.
    Io,
}

impl DeployError {
    /// The stage the run was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            DeployError::FetchLog { .. } | DeployError::DecodeLog { .. } => Stage::FetchingLog,
            DeployError::SchemeMismatch { .. }
            | DeployError::Scratch { .. }
            | DeployError::DownloadArtifact { .. }
            | DeployError::Extract { .. }
            | DeployError::Publish { .. } => Stage::Publishing,
            DeployError::PersistLog { .. } | DeployError::DeleteExpired { .. } => {
                Stage::PersistingLog
            }
            DeployError::MissingInvalidator { .. } | DeployError::Invalidate { .. } => {
                Stage::Invalidating
            }
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::DecodeLog { .. } => DeployErrorKind::MalformedLogEntry,
            DeployError::Extract {
                source: ArchiveError::UnsupportedArchiveFormat(_),
                ..
            } => DeployErrorKind::UnsupportedArchiveFormat,
            DeployError::Extract { source, .. } => match source {
                ArchiveError::Io { .. } => DeployErrorKind::Io,
                _ => DeployErrorKind::ArchiveFailed,
            },
            DeployError::FetchLog { .. }
            | DeployError::DownloadArtifact { .. }
            | DeployError::PersistLog { .. }
            | DeployError::DeleteExpired { .. } => DeployErrorKind::StorageOperationFailed,
            DeployError::Publish { source, .. } => match source {
                PublishError::Upload { .. } => DeployErrorKind::StorageOperationFailed,
                _ => DeployErrorKind::Io,
            },
            DeployError::Scratch { .. } => DeployErrorKind::Io,
            DeployError::SchemeMismatch { .. } | DeployError::MissingInvalidator { .. } => {
                DeployErrorKind::Configuration
            }
            DeployError::Invalidate { .. } => DeployErrorKind::InvalidationFailed,
        }
    }
}
