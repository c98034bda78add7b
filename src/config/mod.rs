// ABOUTME: Configuration types for a deployment run.
// ABOUTME: Merges an optional YAML file with environment variable overrides.

mod deserialize;

use deserialize::{
    deserialize_distribution_option, deserialize_exclude_pattern_option,
    deserialize_location_option,
};

use crate::error::{Error, Result};
use crate::types::{DistributionId, ExcludePattern, ObjectLocation};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const ENV_TARGET: &str = "TARGET_BUCKET_URL";
pub const ENV_DEPLOYMENT_LOG: &str = "DEPLOY_LOG_BUCKET_URL";
pub const ENV_DISTRIBUTION_ID: &str = "CF_DISTRIBUTION_ID";
pub const ENV_EXCLUDE_PATTERN: &str = "EXCLUDE_PATTERN";
pub const ENV_EXPIRE_SECONDS: &str = "EXPIRE_SECONDS";

/// Five days.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(432_000);

/// Validated settings for a deployment run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where site files are published.
    pub target: ObjectLocation,
    /// Object holding the deployment log.
    pub deployment_log: ObjectLocation,
    /// CDN distribution to invalidate after a deploy.
    pub distribution_id: Option<DistributionId>,
    /// Archive entries matching this are not deployed.
    pub exclude_pattern: Option<ExcludePattern>,
    /// How long superseded deployments stay available.
    pub retention: Duration,
}

/// Contents of an optional YAML config file. Every key may be omitted and
/// supplied through the environment instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, deserialize_with = "deserialize_location_option")]
    pub target: Option<ObjectLocation>,

    #[serde(default, deserialize_with = "deserialize_location_option")]
    pub deployment_log: Option<ObjectLocation>,

    #[serde(default, deserialize_with = "deserialize_distribution_option")]
    pub distribution_id: Option<DistributionId>,

    #[serde(default, deserialize_with = "deserialize_exclude_pattern_option")]
    pub exclude_pattern: Option<ExcludePattern>,

    #[serde(default, with = "humantime_serde")]
    pub retention: Option<Duration>,
}

impl ConfigFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

impl Config {
    /// Build the config from process environment variables alone.
    pub fn from_env() -> Result<Self> {
        Self::resolve(ConfigFile::default(), |name| std::env::var(name).ok())
    }

    /// Load `path` (if given) and apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merge `file` with variables from `lookup`; variables win.
    pub fn resolve<F>(file: ConfigFile, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target = match lookup(ENV_TARGET) {
            Some(value) => parse_location(ENV_TARGET, &value)?,
            None => file
                .target
                .ok_or_else(|| Error::MissingEnvVar(ENV_TARGET.to_string()))?,
        };

        let deployment_log = match lookup(ENV_DEPLOYMENT_LOG) {
            Some(value) => parse_location(ENV_DEPLOYMENT_LOG, &value)?,
            None => file
                .deployment_log
                .ok_or_else(|| Error::MissingEnvVar(ENV_DEPLOYMENT_LOG.to_string()))?,
        };

        let distribution_id = match lookup(ENV_DISTRIBUTION_ID) {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(DistributionId::new(value.trim())),
            None => file.distribution_id,
        };

        let exclude_pattern = match lookup(ENV_EXCLUDE_PATTERN) {
            Some(value) if value.is_empty() => None,
            Some(value) => Some(ExcludePattern::new(&value)?),
            None => file.exclude_pattern,
        };

        let retention = match lookup(ENV_EXPIRE_SECONDS) {
            Some(value) => parse_expire_seconds(&value)?,
            None => file.retention.unwrap_or(DEFAULT_RETENTION),
        };

        let config = Config {
            target,
            deployment_log,
            distribution_id,
            exclude_pattern,
            retention,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the locators can be served by a single storage backend.
    pub fn validate(&self) -> Result<()> {
        if self.target.scheme() != self.deployment_log.scheme() {
            return Err(Error::InvalidConfig(format!(
                "target ({}) and deployment log ({}) must use the same storage scheme",
                self.target, self.deployment_log
            )));
        }

        if self.deployment_log.key().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "deployment log locator {} does not name an object",
                self.deployment_log
            )));
        }

        Ok(())
    }
}

fn parse_location(name: &str, value: &str) -> Result<ObjectLocation> {
    ObjectLocation::parse(value).map_err(|source| Error::InvalidLocation {
        name: name.to_string(),
        source,
    })
}

fn parse_expire_seconds(value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| {
            Error::InvalidConfig(format!(
                "{ENV_EXPIRE_SECONDS} must be a non-negative integer, got '{value}'"
            ))
        })
}
