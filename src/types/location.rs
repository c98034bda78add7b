// ABOUTME: Object storage locator parsing and validation.
// ABOUTME: Handles `s3://bucket/key` and `file://root/key` style locators.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseLocationError {
    #[error("storage locator cannot be empty")]
    Empty,

    #[error("storage locator is missing a scheme (expected scheme://bucket/key): {0}")]
    MissingScheme(String),

    #[error("unsupported storage scheme: {0}")]
    UnsupportedScheme(String),

    #[error("storage locator has no bucket: {0}")]
    MissingBucket(String),
}

/// Storage backend addressed by a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Amazon S3 or an S3-compatible service.
    S3,
    /// Local filesystem, mainly for dry runs and tests.
    File,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::S3 => "s3",
            Scheme::File => "file",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `scheme://bucket/key` locator.
///
/// The key never starts with a slash. For `file://` locators the bucket may
/// be empty (`file:///srv/site` addresses the absolute path `/srv/site`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    scheme: Scheme,
    bucket: String,
    key: String,
}

impl ObjectLocation {
    pub fn parse(input: &str) -> Result<Self, ParseLocationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseLocationError::Empty);
        }

        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| ParseLocationError::MissingScheme(input.to_string()))?;

        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "s3" => Scheme::S3,
            "file" => Scheme::File,
            other => return Err(ParseLocationError::UnsupportedScheme(other.to_string())),
        };

        let (bucket, key) = match rest.split_once('/') {
            Some((bucket, key)) => (bucket, key.trim_start_matches('/')),
            None => (rest, ""),
        };

        if bucket.is_empty() && scheme == Scheme::S3 {
            return Err(ParseLocationError::MissingBucket(input.to_string()));
        }

        Ok(Self {
            scheme,
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key of `relative` underneath this location's key prefix.
    pub fn join_key(&self, relative: &str) -> String {
        let relative = relative.trim_start_matches('/');
        let base = self.key.trim_end_matches('/');
        if base.is_empty() {
            relative.to_string()
        } else {
            format!("{base}/{relative}")
        }
    }

    /// Location of `relative` underneath this location.
    pub fn join(&self, relative: &str) -> ObjectLocation {
        ObjectLocation {
            scheme: self.scheme,
            bucket: self.bucket.clone(),
            key: self.join_key(relative),
        }
    }
}

impl FromStr for ObjectLocation {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.bucket)?;
        if !self.key.is_empty() {
            write!(f, "/{}", self.key)?;
        }
        Ok(())
    }
}
