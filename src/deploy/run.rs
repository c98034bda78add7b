// ABOUTME: Drives a deployment through every state in order.
// ABOUTME: Shared by the CLI command and the lifecycle event handler.

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::types::ObjectLocation;

use super::deployment::{Collaborators, Deployment};
use super::error::DeployError;
use super::state::DeploySummary;

/// Run one deployment of `artifact` end to end.
///
/// Stages run strictly in order; the first failure stops the run and no
/// later stage executes. Non-fatal problems are collected in `diag`.
pub async fn run_deployment(
    config: &Config,
    artifact: ObjectLocation,
    collab: &Collaborators,
    diag: &mut Diagnostics,
) -> Result<DeploySummary, DeployError> {
    let storage = collab.storage.as_ref();
    let clock = collab.clock.as_ref();

    tracing::info!("Deploying {} to {}", artifact, config.target);

    let deployment = Deployment::new(config.clone(), artifact)
        .fetch_log(storage)
        .await?
        .publish(storage, clock, collab.scratch_root.as_deref(), diag)
        .await?
        .reconcile(clock)
        .persist_log(storage, diag)
        .await?
        .invalidate(collab.invalidator.as_deref(), clock)
        .await?;

    let summary = deployment.finish();
    tracing::info!(
        "Deployment {} complete: {} uploaded, {} deleted",
        summary.timestamp,
        summary.uploaded,
        summary.deleted
    );
    Ok(summary)
}
