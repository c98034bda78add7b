// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles storage locators, exclude patterns, and distribution ids.

use serde::Deserialize;

use crate::types::{DistributionId, ExcludePattern, ObjectLocation};

pub fn deserialize_location_option<'de, D>(
    deserializer: D,
) -> Result<Option<ObjectLocation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    opt.map(|s| ObjectLocation::parse(&s).map_err(serde::de::Error::custom))
        .transpose()
}

/// An empty pattern means "exclude nothing".
pub fn deserialize_exclude_pattern_option<'de, D>(
    deserializer: D,
) -> Result<Option<ExcludePattern>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => ExcludePattern::new(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

pub fn deserialize_distribution_option<'de, D>(
    deserializer: D,
) -> Result<Option<DistributionId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Err(serde::de::Error::custom(
            "distribution_id cannot be empty",
        )),
        Some(s) => Ok(Some(DistributionId::new(s))),
    }
}
