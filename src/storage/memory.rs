//! In-process emulation backend
//!
//! Behaves like the emulator on the paths the gateway exercises: backend-side
//! bucket name rules, overwrite-on-put, refusing to delete non-empty buckets,
//! idempotent queue/topic creation and a single listing page of at most
//! [`MAX_KEYS_PER_PAGE`] keys. Nothing survives a restart.

use super::traits::{CloudBackend, StorageError};
use crate::types::{BucketInfo, FunctionInfo, ListedObject, TopicInfo};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

/// Page size of ListObjects; keys past this are not returned.
pub const MAX_KEYS_PER_PAGE: usize = 1000;

/// Account id LocalStack uses in URLs and ARNs
const ACCOUNT_ID: &str = "000000000000";

/// Base URL of emulated queue URLs
const QUEUE_ENDPOINT: &str = "http://localhost:4566";

struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    etag: String,
    last_modified: DateTime<Utc>,
}

struct MemoryBucket {
    created: DateTime<Utc>,
    objects: BTreeMap<String, StoredObject>,
}

/// Backend keeping buckets, queues and topics in process memory
pub struct MemoryBackend {
    region: String,
    buckets: RwLock<BTreeMap<String, MemoryBucket>>,
    /// queue name -> URL
    queues: RwLock<BTreeMap<String, String>>,
    /// topic name -> ARN
    topics: RwLock<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            buckets: RwLock::new(BTreeMap::new()),
            queues: RwLock::new(BTreeMap::new()),
            topics: RwLock::new(BTreeMap::new()),
        }
    }

    /// Content type stored with an object, if any
    pub fn content_type_of(&self, bucket: &str, key: &str) -> Option<String> {
        self.buckets
            .read()
            .get(bucket)
            .and_then(|b| b.objects.get(key))
            .and_then(|o| o.content_type.clone())
    }
}

/// S3 bucket naming rules: 3-63 chars of lowercase letters, digits, '.' and '-',
/// starting and ending with a letter or digit, no "..", not shaped like an IPv4 address.
pub fn validate_bucket_name(name: &str) -> Result<(), StorageError> {
    let invalid = || StorageError::InvalidName(name.to_string());

    if !(3..=63).contains(&name.len()) {
        return Err(invalid());
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
    {
        return Err(invalid());
    }
    let first = name.as_bytes()[0];
    let last = name.as_bytes()[name.len() - 1];
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(invalid());
    }
    if name.contains("..") || name.parse::<std::net::Ipv4Addr>().is_ok() {
        return Err(invalid());
    }
    Ok(())
}

/// SQS/SNS naming rules: alphanumerics, '-' and '_', optional ".fifo" suffix.
fn validate_resource_name(name: &str, max_len: usize) -> Result<(), StorageError> {
    let base = name.strip_suffix(".fifo").unwrap_or(name);
    let ok = !base.is_empty()
        && name.len() <= max_len
        && base
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

#[async_trait]
impl CloudBackend for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, StorageError> {
        Ok(self
            .buckets
            .read()
            .iter()
            .map(|(name, bucket)| BucketInfo {
                name: name.clone(),
                creation_date: Some(bucket.created),
            })
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        validate_bucket_name(bucket)?;
        let mut buckets = self.buckets.write();
        if buckets.contains_key(bucket) {
            return Err(StorageError::BucketAlreadyExists(bucket.to_string()));
        }
        buckets.insert(
            bucket.to_string(),
            MemoryBucket {
                created: Utc::now(),
                objects: BTreeMap::new(),
            },
        );
        debug!("Created bucket: {}", bucket);
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write();
        match buckets.get(bucket) {
            None => Err(StorageError::NoSuchBucket(bucket.to_string())),
            Some(b) if !b.objects.is_empty() => {
                Err(StorageError::BucketNotEmpty(bucket.to_string()))
            }
            Some(_) => {
                buckets.remove(bucket);
                debug!("Deleted bucket: {}", bucket);
                Ok(())
            }
        }
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ListedObject>, StorageError> {
        let buckets = self.buckets.read();
        let b = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::NoSuchBucket(bucket.to_string()))?;
        Ok(b.objects
            .iter()
            .take(MAX_KEYS_PER_PAGE)
            .map(|(key, object)| ListedObject {
                key: key.clone(),
                size: object.data.len() as u64,
                last_modified: Some(object.last_modified),
                etag: Some(object.etag.clone()),
                storage_class: Some("STANDARD".to_string()),
            })
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidName(key.to_string()));
        }
        let etag = format!("\"{}\"", hex::encode(Md5::digest(&data)));
        let mut buckets = self.buckets.write();
        let b = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::NoSuchBucket(bucket.to_string()))?;
        debug!("PUT {}/{} ({} bytes)", bucket, key, data.len());
        b.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.map(str::to_string),
                etag,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write();
        let b = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::NoSuchBucket(bucket.to_string()))?;
        // Deleting a missing key succeeds, as on S3
        b.objects.remove(key);
        debug!("DELETE {}/{}", bucket, key);
        Ok(())
    }

    async fn list_functions(&self) -> Result<Vec<FunctionInfo>, StorageError> {
        // No function deployment path exists here, so there is never anything to list.
        Ok(Vec::new())
    }

    async fn list_queues(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.queues.read().values().cloned().collect())
    }

    async fn create_queue(&self, name: &str) -> Result<String, StorageError> {
        validate_resource_name(name, 80)?;
        let url = self
            .queues
            .write()
            .entry(name.to_string())
            .or_insert_with(|| format!("{}/{}/{}", QUEUE_ENDPOINT, ACCOUNT_ID, name))
            .clone();
        Ok(url)
    }

    async fn list_topics(&self) -> Result<Vec<TopicInfo>, StorageError> {
        Ok(self
            .topics
            .read()
            .values()
            .map(|arn| TopicInfo {
                topic_arn: arn.clone(),
            })
            .collect())
    }

    async fn create_topic(&self, name: &str) -> Result<String, StorageError> {
        validate_resource_name(name, 256)?;
        let region = &self.region;
        let arn = self
            .topics
            .write()
            .entry(name.to_string())
            .or_insert_with(|| format!("arn:aws:sns:{}:{}:{}", region, ACCOUNT_ID, name))
            .clone();
        Ok(arn)
    }
}
