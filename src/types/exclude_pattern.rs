// ABOUTME: Regex filter for archive entries that should not be deployed.
// ABOUTME: Matches anywhere in the normalized entry path (search, not full match).

use regex::Regex;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid exclude pattern '{pattern}': {source}")]
pub struct ExcludePatternError {
    pattern: String,
    #[source]
    source: regex::Error,
}

/// Compiled exclude pattern, e.g. `\.map$` to drop source maps.
#[derive(Clone)]
pub struct ExcludePattern(Regex);

impl ExcludePattern {
    pub fn new(pattern: &str) -> Result<Self, ExcludePatternError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|source| ExcludePatternError {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Whether the pattern occurs anywhere in `path`.
    pub fn is_match(&self, path: &str) -> bool {
        self.0.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ExcludePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExcludePattern").field(&self.as_str()).finish()
    }
}

impl fmt::Display for ExcludePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
