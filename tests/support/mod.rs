// ABOUTME: Test support utilities.
// ABOUTME: In-memory storage, recording collaborators and archive fixture builders.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use webapp_deploy::cdn::{CacheInvalidator, InvalidationError};
use webapp_deploy::config::Config;
use webapp_deploy::deploy::{Collaborators, FixedClock};
use webapp_deploy::lifecycle::{CallbackError, CallbackResponse, CallbackSender};
use webapp_deploy::storage::{DeleteFailure, ObjectStorage, StorageError};
use webapp_deploy::types::{DistributionId, ExcludePattern, ObjectLocation};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("webapp_deploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// =============================================================================
// Storage
// =============================================================================

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<(String, String), StoredObject>,
    put_order: Vec<String>,
    delete_calls: Vec<Vec<String>>,
    fail_get: HashSet<String>,
    fail_put: HashSet<String>,
    reject_delete: HashSet<String>,
    fail_delete_request: bool,
}

/// Object storage held in memory, with per-key failure injection.
#[derive(Default, Clone)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.state.lock().objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.into(),
                content_type: None,
            },
        );
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.state
            .lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn text(&self, bucket: &str, key: &str) -> Option<String> {
        self.object(bucket, key)
            .map(|o| String::from_utf8(o.body.to_vec()).unwrap())
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.object(bucket, key).is_some()
    }

    /// Keys in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.state
            .lock()
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Keys in the order they were written.
    pub fn put_order(&self) -> Vec<String> {
        self.state.lock().put_order.clone()
    }

    pub fn delete_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().delete_calls.clone()
    }

    pub fn fail_get(&self, key: &str) {
        self.state.lock().fail_get.insert(key.to_string());
    }

    pub fn fail_put(&self, key: &str) {
        self.state.lock().fail_put.insert(key.to_string());
    }

    /// Report `key` as failed inside an otherwise successful delete.
    pub fn reject_delete(&self, key: &str) {
        self.state.lock().reject_delete.insert(key.to_string());
    }

    pub fn fail_delete_request(&self) {
        self.state.lock().fail_delete_request = true;
    }
}

fn injected(operation: &'static str, key: &str) -> StorageError {
    StorageError::OperationFailed {
        operation,
        key: key.to_string(),
        message: "injected failure".to_string(),
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let state = self.state.lock();
        if state.fail_get.contains(key) {
            return Err(injected("get", key));
        }
        state
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.body.clone())
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        if state.fail_put.contains(key) {
            return Err(injected("put", key));
        }
        state.put_order.push(key.to_string());
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn delete_many(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<DeleteFailure>, StorageError> {
        let mut state = self.state.lock();
        if state.fail_delete_request {
            return Err(injected("delete", bucket));
        }
        state.delete_calls.push(keys.to_vec());

        let mut failures = Vec::new();
        for key in keys {
            if state.reject_delete.contains(key) {
                failures.push(DeleteFailure {
                    key: key.clone(),
                    code: Some("AccessDenied".to_string()),
                    message: Some("Access Denied".to_string()),
                });
            } else {
                state.objects.remove(&(bucket.to_string(), key.clone()));
            }
        }
        Ok(failures)
    }
}

// =============================================================================
// CDN and callbacks
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationCall {
    pub distribution: DistributionId,
    pub paths: Vec<String>,
    pub caller_reference: String,
}

#[derive(Default, Clone)]
pub struct RecordingInvalidator {
    calls: Arc<Mutex<Vec<InvalidationCall>>>,
    fail: bool,
}

impl RecordingInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<InvalidationCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CacheInvalidator for RecordingInvalidator {
    async fn invalidate(
        &self,
        distribution: &DistributionId,
        paths: &[String],
        caller_reference: &str,
    ) -> Result<(), InvalidationError> {
        if self.fail {
            return Err(InvalidationError::RequestFailed("injected failure".to_string()));
        }
        self.calls.lock().push(InvalidationCall {
            distribution: distribution.clone(),
            paths: paths.to_vec(),
            caller_reference: caller_reference.to_string(),
        });
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct RecordingCallback {
    sent: Arc<Mutex<Vec<(String, CallbackResponse)>>>,
    fail: bool,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, CallbackResponse)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl CallbackSender for RecordingCallback {
    async fn send(&self, url: &str, response: &CallbackResponse) -> Result<(), CallbackError> {
        self.sent.lock().push((url.to_string(), response.clone()));
        if self.fail {
            return Err(CallbackError::Rejected {
                status: 403,
                body: "SignatureDoesNotMatch".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Config and collaborators
// =============================================================================

pub const SITE_BUCKET: &str = "site";
pub const TARGET_PREFIX: &str = "web";
pub const LOG_KEY: &str = "deployments.log";
pub const ARTIFACT_BUCKET: &str = "artifacts";

pub fn location(s: &str) -> ObjectLocation {
    ObjectLocation::parse(s).unwrap()
}

/// Target `s3://site/web`, log `s3://site/deployments.log`, five day retention.
pub fn config() -> Config {
    Config {
        target: location("s3://site/web"),
        deployment_log: location("s3://site/deployments.log"),
        distribution_id: None,
        exclude_pattern: None,
        retention: Duration::from_secs(432_000),
    }
}

pub fn config_with(distribution: Option<&str>, exclude: Option<&str>, retention: u64) -> Config {
    Config {
        distribution_id: distribution.map(DistributionId::new),
        exclude_pattern: exclude.map(|p| ExcludePattern::new(p).unwrap()),
        retention: Duration::from_secs(retention),
        ..config()
    }
}

pub fn collaborators(storage: &MemoryStorage, now: i64) -> Collaborators {
    Collaborators::new(Arc::new(storage.clone())).with_clock(Arc::new(FixedClock::at_timestamp(now)))
}

// =============================================================================
// Archive fixtures
// =============================================================================

pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn tgz_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, *contents).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// The reference artifact: a readme, a script and its source map.
pub fn sample_files() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("README.md", b"# sample\n".as_slice()),
        ("index.js", b"console.log('hi');\n".as_slice()),
        ("index.js.map", b"{\"version\":3}".as_slice()),
    ]
}
