// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports state markers, the Deployment struct and the run driver.

mod clock;
mod deployment;
mod error;
mod run;
mod state;
mod transitions;
mod workspace;

pub use clock::{Clock, FixedClock, SystemClock};
pub use deployment::{Collaborators, Deployment};
pub use error::{DeployError, DeployErrorKind, Stage};
pub use run::run_deployment;
pub use state::{
    Completed, DeploySummary, Initialized, LogFetched, LogPersisted, Published, Reconciled,
};
pub use workspace::{SCRATCH_PREFIX, Workspace};
