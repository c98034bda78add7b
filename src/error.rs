// ABOUTME: Application-wide error types for webapp-deploy.
// ABOUTME: Uses thiserror for ergonomic error handling.

use thiserror::Error;

use crate::deploy::DeployError;
use crate::types::{ExcludePatternError, ParseLocationError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid location in {name}: {source}")]
    InvalidLocation {
        name: String,
        #[source]
        source: ParseLocationError,
    },

    #[error(transparent)]
    InvalidExcludePattern(#[from] ExcludePatternError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

pub type Result<T> = std::result::Result<T, Error>;
