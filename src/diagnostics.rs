// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

use crate::storage::DeleteFailure;

/// Collects non-fatal warnings during deployment operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Some expired files could not be deleted and are left orphaned in storage.
    pub fn partial_delete(failures: &[DeleteFailure]) -> Self {
        let details: Vec<String> = failures.iter().map(ToString::to_string).collect();
        Self {
            kind: WarningKind::PartialDeleteFailure,
            message: format!(
                "Errors during delete of {} file(s): {}",
                failures.len(),
                details.join(", ")
            ),
        }
    }

    /// Scratch space could not be removed after the run.
    pub fn scratch_cleanup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ScratchCleanup,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Some keys of a batch delete failed (objects remain orphaned).
    PartialDeleteFailure,
    /// Failed to remove temporary files (they may remain on disk).
    ScratchCleanup,
}
