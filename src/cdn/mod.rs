// ABOUTME: CDN cache invalidation after a deploy.
// ABOUTME: Defines CacheInvalidator and the CloudFront implementation.

use async_trait::async_trait;
use aws_sdk_cloudfront::Client;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};

use crate::types::DistributionId;

/// Paths invalidated after every deploy.
pub const INVALIDATE_ALL: &str = "/*";

/// Errors from cache invalidation requests.
#[derive(Debug, thiserror::Error)]
pub enum InvalidationError {
    #[error("invalid invalidation request: {0}")]
    InvalidRequest(String),

    #[error("invalidation request failed: {0}")]
    RequestFailed(String),
}

/// Issues cache invalidations for a CDN distribution.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Request invalidation of `paths`.
    ///
    /// `caller_reference` makes the request idempotent: repeating a call with
    /// the same reference does not create a second invalidation.
    async fn invalidate(
        &self,
        distribution: &DistributionId,
        paths: &[String],
        caller_reference: &str,
    ) -> Result<(), InvalidationError>;
}

/// CloudFront-backed cache invalidation.
#[derive(Clone)]
pub struct CloudFrontInvalidator {
    client: Client,
}

impl CloudFrontInvalidator {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Build a client from the ambient AWS configuration.
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_from_env().await;
        Self::new(&sdk_config)
    }
}

#[async_trait]
impl CacheInvalidator for CloudFrontInvalidator {
    async fn invalidate(
        &self,
        distribution: &DistributionId,
        paths: &[String],
        caller_reference: &str,
    ) -> Result<(), InvalidationError> {
        let quantity = i32::try_from(paths.len())
            .map_err(|_| InvalidationError::InvalidRequest("too many paths".to_string()))?;

        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(paths.to_vec()))
            .build()
            .map_err(|e| InvalidationError::InvalidRequest(e.to_string()))?;

        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(caller_reference)
            .build()
            .map_err(|e| InvalidationError::InvalidRequest(e.to_string()))?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(distribution.as_str())
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| InvalidationError::RequestFailed(e.into_service_error().to_string()))?;

        if let Some(id) = output.invalidation().map(|i| i.id()) {
            tracing::debug!("Created invalidation {} for {}", id, distribution);
        }

        Ok(())
    }
}
