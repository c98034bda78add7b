// ABOUTME: Deploy command implementation.
// ABOUTME: Loads config, builds collaborators and runs one deployment.

use std::path::Path;

use webapp_deploy::config::Config;
use webapp_deploy::deploy::{Collaborators, run_deployment};
use webapp_deploy::diagnostics::Diagnostics;
use webapp_deploy::error::{Error, Result};
use webapp_deploy::output::Output;
use webapp_deploy::types::ObjectLocation;

/// Deploy `artifact` using settings from the environment and `config_path`.
pub async fn deploy(artifact: &str, config_path: Option<&Path>, mut output: Output) -> Result<()> {
    let artifact = ObjectLocation::parse(artifact).map_err(|source| Error::InvalidLocation {
        name: "artifact".to_string(),
        source,
    })?;
    let config = Config::load(config_path)?;

    output.start_timer();
    output.progress(&format!("Deploying {} to {}", artifact, config.target));

    let collaborators = Collaborators::for_config(&config).await;
    let mut diag = Diagnostics::default();
    let summary = run_deployment(&config, artifact, &collaborators, &mut diag).await?;

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    output.summary(&summary);
    Ok(())
}
