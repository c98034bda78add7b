// ABOUTME: Amazon S3 backend for ObjectStorage.
// ABOUTME: Wraps aws-sdk-s3 get/put/delete_objects and maps errors to StorageError.

use super::{DeleteFailure, ObjectStorage, StorageError};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use bytes::Bytes;

/// S3 allows at most this many keys per DeleteObjects request.
const MAX_DELETE_BATCH: usize = 1000;

/// S3-backed object storage.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn failed(operation: &'static str, key: &str, message: impl ToString) -> StorageError {
    StorageError::OperationFailed {
        operation,
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let response = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(response) => response,
            Err(e) => {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    return Err(StorageError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    });
                }
                return Err(failed("get", key, err));
            }
        };

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| failed("get", key, e))?;
        Ok(body.into_bytes())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| failed("put", key, e.into_service_error()))?;
        Ok(())
    }

    async fn delete_many(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<DeleteFailure>, StorageError> {
        let mut failures = Vec::new();

        for batch in keys.chunks(MAX_DELETE_BATCH) {
            let objects = batch
                .iter()
                .map(|key| {
                    ObjectIdentifier::builder()
                        .key(key)
                        .build()
                        .map_err(|e| failed("delete", key, e))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let first_key = batch.first().map(String::as_str).unwrap_or_default();
            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| failed("delete", first_key, e))?;

            let output = self
                .client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| failed("delete", first_key, e.into_service_error()))?;

            failures.extend(output.errors().iter().map(|error| DeleteFailure {
                key: error.key().unwrap_or_default().to_string(),
                code: error.code().map(str::to_string),
                message: error.message().map(str::to_string),
            }));
        }

        Ok(failures)
    }
}
