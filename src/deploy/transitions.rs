// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt, ensure};

use crate::archive::{self, ArchiveError, ArchiveKind};
use crate::cdn::{CacheInvalidator, INVALIDATE_ALL};
use crate::diagnostics::{Diagnostics, Warning};
use crate::history::{self, DeploymentHistory};
use crate::publish::Publisher;
use crate::storage::ObjectStorage;

use super::Deployment;
use super::clock::Clock;
use super::error::{
    DecodeLogSnafu, DeleteExpiredSnafu, DeployError, DownloadArtifactSnafu, ExtractSnafu,
    InvalidateSnafu, MissingInvalidatorSnafu, PersistLogSnafu, PublishSnafu, SchemeMismatchSnafu,
    ScratchSnafu,
};
use super::state::{
    Completed, DeploySummary, Initialized, LogFetched, LogPersisted, Published, Reconciled,
};
use super::workspace::Workspace;

// =============================================================================
// Internal Helpers
// =============================================================================

impl<S> Deployment<S> {
    /// Internal helper to move into the next state.
    fn transition<T>(self, state: T) -> Deployment<T> {
        Deployment {
            config: self.config,
            artifact: self.artifact,
            state,
        }
    }
}

// =============================================================================
// Initialized -> LogFetched
// =============================================================================

impl Deployment<Initialized> {
    /// Load the deployment log. A missing log is the first deploy and yields
    /// an empty history.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::DecodeLog` if the log is corrupt and
    /// `DeployError::FetchLog` if storage fails.
    pub async fn fetch_log(
        self,
        storage: &dyn ObjectStorage,
    ) -> Result<Deployment<LogFetched>, DeployError> {
        let location = &self.config.deployment_log;
        tracing::info!("Fetching deployments log from {}", location);

        let history = match storage.get(location.bucket(), location.key()).await {
            Ok(body) => history::decode(&body).context(DecodeLogSnafu {
                location: location.clone(),
            })?,
            Err(e) if e.is_not_found() => {
                tracing::info!("No deployments log at {}, starting a new one", location);
                DeploymentHistory::new()
            }
            Err(source) => {
                return Err(DeployError::FetchLog {
                    location: location.clone(),
                    source,
                });
            }
        };

        tracing::debug!("Loaded {} deployment record(s)", history.len());
        Ok(self.transition(LogFetched { history }))
    }
}

// =============================================================================
// LogFetched -> Published
// =============================================================================

impl Deployment<LogFetched> {
    /// Download and extract the artifact, upload its files and append the
    /// new records to the history.
    ///
    /// Scratch space is removed before returning, on success and failure.
    ///
    /// # Errors
    ///
    /// Returns error if the artifact cannot be downloaded, extracted or
    /// uploaded.
    pub async fn publish(
        self,
        storage: &dyn ObjectStorage,
        clock: &dyn Clock,
        scratch_root: Option<&Path>,
        diag: &mut Diagnostics,
    ) -> Result<Deployment<Published>, DeployError> {
        let target = &self.config.target;
        ensure!(
            self.artifact.scheme() == target.scheme(),
            SchemeMismatchSnafu {
                artifact: self.artifact.clone(),
                target: target.clone(),
            }
        );

        let kind = ArchiveKind::from_name(self.artifact.key()).context(ExtractSnafu {
            location: self.artifact.clone(),
        })?;
        let timestamp = clock.now().timestamp();

        let workspace = Workspace::acquire_in(scratch_root).context(ScratchSnafu)?;
        let result = self.publish_in(&workspace, kind, storage, timestamp).await;
        let scratch = workspace.root().to_path_buf();
        if let Err(e) = workspace.release() {
            diag.warn(Warning::scratch_cleanup(format!(
                "Failed to remove scratch directory {}: {}",
                scratch.display(),
                e
            )));
        }

        let records = result?;
        let uploaded = records.len();
        let mut history = self.state.history.clone();
        history.extend(records);

        Ok(self.transition(Published {
            history,
            timestamp,
            uploaded,
        }))
    }

    async fn publish_in(
        &self,
        workspace: &Workspace,
        kind: ArchiveKind,
        storage: &dyn ObjectStorage,
        timestamp: i64,
    ) -> Result<Vec<history::DeploymentRecord>, DeployError> {
        let archive_path = workspace.archive_path();

        tracing::info!("Downloading {}", self.artifact);
        storage
            .download(self.artifact.bucket(), self.artifact.key(), &archive_path)
            .await
            .context(DownloadArtifactSnafu {
                location: self.artifact.clone(),
            })?;

        let extract_dir = workspace.extract_dir().to_path_buf();
        let report = extract_blocking(
            archive_path,
            kind,
            extract_dir.clone(),
            self.config.exclude_pattern.clone(),
        )
        .await
        .context(ExtractSnafu {
            location: self.artifact.clone(),
        })?;
        tracing::debug!(
            "Extracted {} file(s), skipped {}",
            report.extracted.len(),
            report.skipped.len()
        );

        Publisher::new(storage, &self.config.target)
            .publish(&extract_dir, timestamp)
            .await
            .context(PublishSnafu {
                location: self.config.target.clone(),
            })
    }
}

/// Run the synchronous extractor off the async worker threads.
async fn extract_blocking(
    source: PathBuf,
    kind: ArchiveKind,
    dest: PathBuf,
    exclude: Option<crate::types::ExcludePattern>,
) -> Result<archive::ExtractReport, ArchiveError> {
    tokio::task::spawn_blocking(move || archive::extract(&source, kind, &dest, exclude.as_ref()))
        .await
        .map_err(|e| ArchiveError::io(PathBuf::new(), std::io::Error::other(e)))?
}

// =============================================================================
// Published -> Reconciled
// =============================================================================

impl Deployment<Published> {
    /// Apply the retention window to the history.
    ///
    /// Deployments older than `now - retention` are expired; see
    /// [`history::reconcile`] for which of them are dropped.
    pub fn reconcile(self, clock: &dyn Clock) -> Deployment<Reconciled> {
        let retention = i64::try_from(self.config.retention.as_secs()).unwrap_or(i64::MAX);
        let cutoff = clock.now().timestamp().saturating_sub(retention);

        let reconciliation = history::reconcile(&self.state.history, cutoff);
        match reconciliation.boundary {
            Some(boundary) => tracing::info!(
                "Pruned deployments older than {}, {} file(s) to delete",
                boundary,
                reconciliation.deletable.len()
            ),
            None => tracing::debug!("No deployments to prune before {}", cutoff),
        }

        let Published {
            timestamp,
            uploaded,
            ..
        } = self.state;
        self.transition(Reconciled {
            reconciliation,
            timestamp,
            uploaded,
        })
    }
}

// =============================================================================
// Reconciled -> LogPersisted
// =============================================================================

impl Deployment<Reconciled> {
    /// Overwrite the deployment log with the surviving history, then delete
    /// files no retained deployment references.
    ///
    /// Keys that fail to delete are recorded as warnings; they stay behind as
    /// orphans rather than failing a deploy whose content is already live.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::PersistLog` if the log cannot be written and
    /// `DeployError::DeleteExpired` if the delete request itself fails.
    pub async fn persist_log(
        self,
        storage: &dyn ObjectStorage,
        diag: &mut Diagnostics,
    ) -> Result<Deployment<LogPersisted>, DeployError> {
        let location = &self.config.deployment_log;
        let surviving = &self.state.reconciliation.surviving;

        tracing::info!("Uploading deployments log to {}", location);
        storage
            .put(
                location.bucket(),
                location.key(),
                history::encode(surviving).into(),
                None,
            )
            .await
            .context(PersistLogSnafu {
                location: location.clone(),
            })?;

        let target = &self.config.target;
        let deletable = &self.state.reconciliation.deletable;
        let mut failures = Vec::new();
        if !deletable.is_empty() {
            let keys: Vec<String> = deletable
                .iter()
                .map(|filename| {
                    tracing::info!("Deleting {}", filename);
                    target.join_key(filename)
                })
                .collect();

            failures = storage
                .delete_many(target.bucket(), &keys)
                .await
                .context(DeleteExpiredSnafu {
                    location: target.clone(),
                })?;

            if !failures.is_empty() {
                diag.warn(Warning::partial_delete(&failures));
            }
        }

        let summary = DeploySummary {
            timestamp: self.state.timestamp,
            uploaded: self.state.uploaded,
            retained_records: surviving.len(),
            retained_deployments: surviving.timestamps().len(),
            deleted: deletable.len() - failures.len().min(deletable.len()),
            delete_failures: failures.len(),
            invalidated: false,
        };

        Ok(self.transition(LogPersisted { summary }))
    }
}

// =============================================================================
// LogPersisted -> Completed
// =============================================================================

impl Deployment<LogPersisted> {
    /// Invalidate the CDN cache when a distribution is configured; otherwise
    /// this step is skipped.
    ///
    /// The caller reference is the current time in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Invalidate` if the CDN rejects the request.
    pub async fn invalidate(
        self,
        invalidator: Option<&dyn CacheInvalidator>,
        clock: &dyn Clock,
    ) -> Result<Deployment<Completed>, DeployError> {
        let mut summary = self.state.summary.clone();

        if let Some(distribution) = &self.config.distribution_id {
            let invalidator = invalidator.context(MissingInvalidatorSnafu {
                distribution: distribution.clone(),
            })?;

            tracing::info!("Creating CDN invalidation for {}", distribution);
            let caller_reference = clock.now().timestamp_millis().to_string();
            invalidator
                .invalidate(distribution, &[INVALIDATE_ALL.to_string()], &caller_reference)
                .await
                .context(InvalidateSnafu {
                    distribution: distribution.clone(),
                })?;
            summary.invalidated = true;
        } else {
            tracing::debug!("No distribution configured, skipping invalidation");
        }

        Ok(self.transition(Completed { summary }))
    }
}
