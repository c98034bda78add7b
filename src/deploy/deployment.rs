// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: State types carry their own data for compile-time guarantees.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cdn::{CacheInvalidator, CloudFrontInvalidator};
use crate::config::Config;
use crate::storage::{ObjectStorage, StorageBackend};
use crate::types::ObjectLocation;

use super::clock::{Clock, SystemClock};
use super::state::{Completed, DeploySummary, Initialized};

/// A deployment in progress, parameterized by its current state.
///
/// Each transition consumes the deployment and returns it in the next
/// state, so steps cannot be skipped or repeated. A failed transition
/// returns the error instead, which ends the run.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) config: Config,
    pub(crate) artifact: ObjectLocation,
    pub(crate) state: S,
}

impl Deployment<Initialized> {
    /// Start deploying `artifact` with `config`.
    pub fn new(config: Config, artifact: ObjectLocation) -> Self {
        Deployment {
            config,
            artifact,
            state: Initialized,
        }
    }
}

impl<S> Deployment<S> {
    /// Get the config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the artifact being deployed.
    pub fn artifact(&self) -> &ObjectLocation {
        &self.artifact
    }

    /// Get the state data.
    pub fn state(&self) -> &S {
        &self.state
    }
}

impl Deployment<Completed> {
    /// Finish the run and return what it did.
    pub fn finish(self) -> DeploySummary {
        self.state.summary
    }
}

/// External services a deployment talks to, built once at startup.
#[derive(Clone)]
pub struct Collaborators {
    pub storage: Arc<dyn ObjectStorage>,
    pub invalidator: Option<Arc<dyn CacheInvalidator>>,
    pub clock: Arc<dyn Clock>,
    /// Parent of the per-run scratch directory; the system temp dir if unset.
    pub scratch_root: Option<PathBuf>,
}

impl Collaborators {
    /// Collaborators with no cache invalidation and the system clock.
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            storage,
            invalidator: None,
            clock: Arc::new(SystemClock),
            scratch_root: None,
        }
    }

    /// Production backends for `config`: storage chosen by the target's
    /// scheme, CloudFront only when a distribution is configured.
    pub async fn for_config(config: &Config) -> Self {
        let storage = StorageBackend::for_scheme(config.target.scheme()).await;
        let collaborators = Self::new(Arc::new(storage));
        if config.distribution_id.is_some() {
            collaborators.with_invalidator(Arc::new(CloudFrontInvalidator::from_env().await))
        } else {
            collaborators
        }
    }

    pub fn with_invalidator(mut self, invalidator: Arc<dyn CacheInvalidator>) -> Self {
        self.invalidator = Some(invalidator);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }
}
