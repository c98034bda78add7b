// ABOUTME: Line-oriented codec for the persisted deployment log.
// ABOUTME: Each line is `timestamp<TAB>filename`; the whole log is rewritten every run.

use super::{DeploymentHistory, DeploymentRecord, RecordError};
use thiserror::Error;

const SEPARATOR: char = '\t';

/// Errors from decoding a deployment log.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogCodecError {
    /// A line could not be parsed into a record.
    #[error("malformed deployment log entry on line {line}: {reason} ({content:?})")]
    MalformedLogEntry {
        line: usize,
        content: String,
        reason: MalformedReason,
    },

    #[error("deployment log is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Why a log line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("missing tab separator")]
    MissingSeparator,

    #[error("timestamp is not an integer")]
    InvalidTimestamp,

    #[error(transparent)]
    InvalidRecord(#[from] RecordError),
}

/// Decode a persisted deployment log.
///
/// Blank lines are ignored and a trailing carriage return is stripped, so
/// logs edited by hand on other platforms still load.
pub fn decode(bytes: &[u8]) -> Result<DeploymentHistory, LogCodecError> {
    let text =
        std::str::from_utf8(bytes).map_err(|e| LogCodecError::InvalidUtf8(e.to_string()))?;

    let mut history = DeploymentHistory::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.is_empty() {
            continue;
        }
        let record = decode_line(line).map_err(|reason| LogCodecError::MalformedLogEntry {
            line: index + 1,
            content: line.to_string(),
            reason,
        })?;
        history.push(record);
    }

    Ok(history)
}

fn decode_line(line: &str) -> Result<DeploymentRecord, MalformedReason> {
    let (timestamp, filename) = line
        .split_once(SEPARATOR)
        .ok_or(MalformedReason::MissingSeparator)?;

    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| MalformedReason::InvalidTimestamp)?;

    Ok(DeploymentRecord::new(timestamp, filename)?)
}

/// Encode a history as a deployment log, one LF-terminated line per record.
pub fn encode(history: &DeploymentHistory) -> Vec<u8> {
    let mut out = String::new();
    for record in history {
        out.push_str(&record.timestamp().to_string());
        out.push(SEPARATOR);
        out.push_str(record.filename());
        out.push('\n');
    }
    out.into_bytes()
}
