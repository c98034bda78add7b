// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Storage locators, exclude patterns, and phantom-typed IDs.

mod exclude_pattern;
mod id;
mod location;

pub use exclude_pattern::{ExcludePattern, ExcludePatternError};
pub use id::{DistributionId, Id, IdKind, PhysicalResourceId};
pub use location::{ObjectLocation, ParseLocationError, Scheme};
