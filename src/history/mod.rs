// ABOUTME: Deployment history data model shared by the log codec and retention engine.
// ABOUTME: One record per (deployment time, published file) pair.

pub mod codec;
pub mod retention;

pub use codec::{LogCodecError, decode, encode};
pub use retention::{Reconciliation, reconcile};

use std::collections::BTreeSet;
use thiserror::Error;

/// Reasons a record cannot be constructed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("deployment timestamp cannot be negative: {0}")]
    NegativeTimestamp(i64),

    #[error("deployment filename cannot be empty")]
    EmptyFilename,

    #[error("deployment filename cannot contain a line break: {0:?}")]
    LineBreakInFilename(String),
}

/// A single file published by a deployment.
///
/// Timestamps are unix seconds and never negative. Filenames are relative to
/// the deploy target, never empty, and never contain `\n` or `\r`, since
/// the log stores one record per line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeploymentRecord {
    timestamp: i64,
    filename: String,
}

impl DeploymentRecord {
    pub fn new(timestamp: i64, filename: impl Into<String>) -> Result<Self, RecordError> {
        let filename = filename.into();
        if timestamp < 0 {
            return Err(RecordError::NegativeTimestamp(timestamp));
        }
        if filename.is_empty() {
            return Err(RecordError::EmptyFilename);
        }
        if filename.contains(['\n', '\r']) {
            return Err(RecordError::LineBreakInFilename(filename));
        }
        Ok(Self {
            timestamp,
            filename,
        })
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// All deployment records known for a target.
///
/// Order carries no meaning, but it is preserved so the persisted log is
/// rewritten in the order it was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentHistory {
    records: Vec<DeploymentRecord>,
}

impl DeploymentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DeploymentRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeploymentRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[DeploymentRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DeploymentRecord> {
        self.records
    }

    /// Distinct deployment timestamps, oldest first.
    pub fn timestamps(&self) -> BTreeSet<i64> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    /// Distinct filenames referenced by any deployment.
    pub fn filenames(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.filename.as_str()).collect()
    }
}

impl FromIterator<DeploymentRecord> for DeploymentHistory {
    fn from_iter<I: IntoIterator<Item = DeploymentRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<DeploymentRecord> for DeploymentHistory {
    fn extend<I: IntoIterator<Item = DeploymentRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl IntoIterator for DeploymentHistory {
    type Item = DeploymentRecord;
    type IntoIter = std::vec::IntoIter<DeploymentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a DeploymentHistory {
    type Item = &'a DeploymentRecord;
    type IntoIter = std::slice::Iter<'a, DeploymentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
