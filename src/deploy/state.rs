// ABOUTME: Deployment state types for the type state pattern.
// ABOUTME: Each state carries the data produced by the step that entered it.

use crate::history::{DeploymentHistory, Reconciliation};

/// Initial state: nothing fetched yet.
/// Available actions: `fetch_log()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Deployment log loaded (empty on the first deploy).
/// Available actions: `publish()`
#[derive(Debug, Clone)]
pub struct LogFetched {
    pub(crate) history: DeploymentHistory,
}

impl LogFetched {
    pub fn history(&self) -> &DeploymentHistory {
        &self.history
    }
}

/// Artifact uploaded; history includes the new deployment.
/// Available actions: `reconcile()`
#[derive(Debug, Clone)]
pub struct Published {
    pub(crate) history: DeploymentHistory,
    pub(crate) timestamp: i64,
    pub(crate) uploaded: usize,
}

/// Retention applied; surviving history and deletable files known.
/// Available actions: `persist_log()`
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub(crate) reconciliation: Reconciliation,
    pub(crate) timestamp: i64,
    pub(crate) uploaded: usize,
}

impl Reconciled {
    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }
}

/// Log persisted and expired files deleted.
/// Available actions: `invalidate()`
#[derive(Debug, Clone)]
pub struct LogPersisted {
    pub(crate) summary: DeploySummary,
}

/// Deployment finished.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) summary: DeploySummary,
}

/// What a finished deployment did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploySummary {
    /// Timestamp shared by all records of this deployment.
    pub timestamp: i64,
    /// Files uploaded by this deployment.
    pub uploaded: usize,
    /// Records kept in the deployment log.
    pub retained_records: usize,
    /// Distinct deployments kept in the deployment log.
    pub retained_deployments: usize,
    /// Expired files removed from the target.
    pub deleted: usize,
    /// Expired files that could not be removed.
    pub delete_failures: usize,
    /// Whether a CDN invalidation was requested.
    pub invalidated: bool,
}
