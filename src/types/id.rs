// ABOUTME: Identifiers of external resources, typed by the kind of resource they name.
// ABOUTME: Keeps CDN distribution IDs and lifecycle resource IDs from being swapped.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Kind of resource an [`Id`] names.
pub trait IdKind {
    /// Name used in debug output.
    const LABEL: &'static str;
}

pub enum Distribution {}
pub enum PhysicalResource {}

impl IdKind for Distribution {
    const LABEL: &'static str = "DistributionId";
}

impl IdKind for PhysicalResource {
    const LABEL: &'static str = "PhysicalResourceId";
}

/// An external identifier. Plain string on the wire, distinct type per kind.
pub struct Id<K: IdKind> {
    value: String,
    _kind: PhantomData<K>,
}

impl<K: IdKind> Id<K> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _kind: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<K: IdKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::LABEL, self.value)
    }
}

impl<K: IdKind> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K: IdKind> Clone for Id<K> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<K: IdKind> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K: IdKind> Eq for Id<K> {}

impl<K: IdKind> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, K: IdKind> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// CDN distribution whose cache is invalidated after a deploy.
pub type DistributionId = Id<Distribution>;
/// Identifier reported back to the provisioning engine for the managed resource.
pub type PhysicalResourceId = Id<PhysicalResource>;
