//! Backend trait definitions

use crate::types::{BucketInfo, FunctionInfo, ListedObject, TopicInfo};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during backend operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Bucket not found: {0}")]
    NoSuchBucket(String),

    #[error("Bucket not empty: {0}")]
    BucketNotEmpty(String),

    #[error("Bucket already exists: {0}")]
    BucketAlreadyExists(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("{operation} failed: {message}")]
    Sdk {
        operation: &'static str,
        message: String,
    },

    #[error("Backend error: {0}")]
    Other(String),
}

/// The emulated cloud services the gateway forwards to.
///
/// Every method maps to exactly one backend call; nothing is retried or cached.
/// Object-safe, used as `Arc<dyn CloudBackend>`.
#[async_trait]
pub trait CloudBackend: Send + Sync {
    /// Short label for logs and /health
    fn kind(&self) -> &'static str;

    // === Object storage ===

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, StorageError>;

    /// Name validation is entirely the backend's business
    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    /// Whether a non-empty bucket can be deleted is the backend's policy
    async fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    /// First page of the bucket's objects only. No continuation.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ListedObject>, StorageError>;

    /// Store `data` under `key`, replacing any existing object with that key
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    // === Functions, queues, topics ===

    async fn list_functions(&self) -> Result<Vec<FunctionInfo>, StorageError>;

    /// Queue URLs
    async fn list_queues(&self) -> Result<Vec<String>, StorageError>;

    /// Returns the queue URL
    async fn create_queue(&self, name: &str) -> Result<String, StorageError>;

    async fn list_topics(&self) -> Result<Vec<TopicInfo>, StorageError>;

    /// Returns the topic ARN
    async fn create_topic(&self, name: &str) -> Result<String, StorageError>;
}
