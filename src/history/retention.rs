// ABOUTME: Retention engine that prunes expired deployments from the history.
// ABOUTME: Only files referenced exclusively by pruned deployments become deletable.

use super::DeploymentHistory;
use std::collections::BTreeSet;

/// Outcome of reconciling a history against an expiry cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Records that remain in the persisted log.
    pub surviving: DeploymentHistory,
    /// Filenames (relative to the deploy target) that no retained deployment references.
    pub deletable: BTreeSet<String>,
    /// Newest expired deployment, kept as a safety margin. `None` when nothing was pruned.
    pub boundary: Option<i64>,
}

impl Reconciliation {
    /// True when the history came through unchanged.
    pub fn is_noop(&self) -> bool {
        self.boundary.is_none()
    }
}

/// Prune deployments older than `expiry_cutoff`, keeping the newest expired one.
///
/// A deployment is expired when its timestamp is strictly below the cutoff.
/// With at most one expired deployment nothing is pruned. Otherwise every
/// deployment older than the newest expired one is dropped, and its files
/// become deletable unless a retained deployment also references them.
pub fn reconcile(records: &DeploymentHistory, expiry_cutoff: i64) -> Reconciliation {
    let expired: BTreeSet<i64> = records
        .timestamps()
        .into_iter()
        .filter(|ts| *ts < expiry_cutoff)
        .collect();

    // BTreeSet iterates in ascending order, so the last element is the newest.
    let boundary = match expired.last() {
        Some(&newest) if expired.len() > 1 => newest,
        _ => {
            return Reconciliation {
                surviving: records.clone(),
                deletable: BTreeSet::new(),
                boundary: None,
            };
        }
    };

    let keep_files: BTreeSet<&str> = records
        .iter()
        .filter(|r| r.timestamp() >= boundary)
        .map(|r| r.filename())
        .collect();

    let deletable = records
        .iter()
        .filter(|r| r.timestamp() < boundary && !keep_files.contains(r.filename()))
        .map(|r| r.filename().to_string())
        .collect();

    let surviving = records
        .iter()
        .filter(|r| r.timestamp() >= boundary)
        .cloned()
        .collect();

    Reconciliation {
        surviving,
        deletable,
        boundary: Some(boundary),
    }
}
