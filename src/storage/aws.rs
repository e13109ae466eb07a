//! AWS SDK backend
//!
//! Talks to an AWS-compatible emulation endpoint (LocalStack and similar) with
//! static credentials, an explicit endpoint and forced path-style addressing.
//! Clients are built once and shared read-only across requests.

use super::traits::{CloudBackend, StorageError};
use crate::config::BackendConfig;
use crate::types::{BucketInfo, FunctionInfo, ListedObject, TopicInfo};
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::{ByteStream, DateTime as SmithyDateTime};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// Backend forwarding to S3, Lambda, SQS and SNS emulation APIs
pub struct AwsBackend {
    s3: aws_sdk_s3::Client,
    lambda: aws_sdk_lambda::Client,
    sqs: aws_sdk_sqs::Client,
    sns: aws_sdk_sns::Client,
}

impl AwsBackend {
    /// Build all service clients from one backend configuration
    pub fn new(config: &BackendConfig) -> Result<Self, StorageError> {
        let (endpoint, region, access_key_id, secret_access_key) = match config {
            BackendConfig::Aws {
                endpoint,
                region,
                access_key_id,
                secret_access_key,
            } => (
                endpoint.as_str(),
                region.clone(),
                access_key_id.as_str(),
                secret_access_key.as_str(),
            ),
            _ => {
                return Err(StorageError::Other(
                    "AwsBackend requires AWS configuration".to_string(),
                ))
            }
        };

        // Static credentials only; never fall back to the default AWS credential chain
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "emulator_gateway-config",
        );

        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .credentials_provider(credentials.clone())
            .endpoint_url(endpoint)
            // Local emulators cannot resolve virtual-hosted bucket names
            .force_path_style(true)
            .build();

        let lambda_config = aws_sdk_lambda::config::Builder::new()
            .behavior_version(aws_sdk_lambda::config::BehaviorVersion::latest())
            .region(aws_sdk_lambda::config::Region::new(region.clone()))
            .credentials_provider(credentials.clone())
            .endpoint_url(endpoint)
            .build();

        let sqs_config = aws_sdk_sqs::config::Builder::new()
            .behavior_version(aws_sdk_sqs::config::BehaviorVersion::latest())
            .region(aws_sdk_sqs::config::Region::new(region.clone()))
            .credentials_provider(credentials.clone())
            .endpoint_url(endpoint)
            .build();

        let sns_config = aws_sdk_sns::config::Builder::new()
            .behavior_version(aws_sdk_sns::config::BehaviorVersion::latest())
            .region(aws_sdk_sns::config::Region::new(region))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .build();

        debug!("AwsBackend initialized against {}", endpoint);
        Ok(Self {
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            lambda: aws_sdk_lambda::Client::from_conf(lambda_config),
            sqs: aws_sdk_sqs::Client::from_conf(sqs_config),
            sns: aws_sdk_sns::Client::from_conf(sns_config),
        })
    }

    /// Wrap any SDK error with its full context chain. Callers only ever see the
    /// generic per-route message; this detail goes to the server log.
    fn sdk_error(operation: &'static str, e: impl std::error::Error) -> StorageError {
        StorageError::Sdk {
            operation,
            message: DisplayErrorContext(e).to_string(),
        }
    }
}

fn to_chrono(dt: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

#[async_trait]
impl CloudBackend for AwsBackend {
    fn kind(&self) -> &'static str {
        "aws"
    }

    // === Object storage ===

    #[instrument(skip(self))]
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, StorageError> {
        let response = self
            .s3
            .list_buckets()
            .send()
            .await
            .map_err(|e| Self::sdk_error("list_buckets", e))?;

        let buckets: Vec<BucketInfo> = response
            .buckets()
            .iter()
            .filter_map(|b| {
                b.name().map(|name| BucketInfo {
                    name: name.to_string(),
                    creation_date: b.creation_date().and_then(to_chrono),
                })
            })
            .collect();
        debug!("Listed {} buckets", buckets.len());
        Ok(buckets)
    }

    #[instrument(skip(self))]
    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.s3
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| Self::sdk_error("create_bucket", e))?;
        debug!("Created bucket: {}", bucket);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.s3
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| Self::sdk_error("delete_bucket", e))?;
        debug!("Deleted bucket: {}", bucket);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ListedObject>, StorageError> {
        // Single ListObjects page; a truncated listing is returned as-is.
        let response = self
            .s3
            .list_objects()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| Self::sdk_error("list_objects", e))?;

        if response.is_truncated().unwrap_or(false) {
            debug!("Listing of {} truncated at the first page", bucket);
        }

        let objects: Vec<ListedObject> = response
            .contents()
            .iter()
            .filter_map(|object| {
                object.key().map(|key| ListedObject {
                    key: key.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object.last_modified().and_then(to_chrono),
                    etag: object.e_tag().map(str::to_string),
                    storage_class: object.storage_class().map(|c| c.as_str().to_string()),
                })
            })
            .collect();
        debug!("Listed {} objects in {}", objects.len(), bucket);
        Ok(objects)
    }

    #[instrument(skip(self, data))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let size = data.len();
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| Self::sdk_error("put_object", e))?;
        debug!("PUT {}/{} ({} bytes)", bucket, key, size);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.s3
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::sdk_error("delete_object", e))?;
        debug!("DELETE {}/{}", bucket, key);
        Ok(())
    }

    // === Functions, queues, topics ===

    #[instrument(skip(self))]
    async fn list_functions(&self) -> Result<Vec<FunctionInfo>, StorageError> {
        let response = self
            .lambda
            .list_functions()
            .send()
            .await
            .map_err(|e| Self::sdk_error("list_functions", e))?;

        Ok(response
            .functions()
            .iter()
            .map(|f| FunctionInfo {
                function_name: f.function_name().unwrap_or_default().to_string(),
                function_arn: f.function_arn().map(str::to_string),
                runtime: f.runtime().map(|r| r.as_str().to_string()),
                handler: f.handler().map(str::to_string),
                role: f.role().map(str::to_string),
                code_size: f.code_size(),
                description: f.description().map(str::to_string),
                timeout: f.timeout(),
                memory_size: f.memory_size(),
                last_modified: f.last_modified().map(str::to_string),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_queues(&self) -> Result<Vec<String>, StorageError> {
        let response = self
            .sqs
            .list_queues()
            .send()
            .await
            .map_err(|e| Self::sdk_error("list_queues", e))?;
        Ok(response.queue_urls().to_vec())
    }

    #[instrument(skip(self))]
    async fn create_queue(&self, name: &str) -> Result<String, StorageError> {
        let response = self
            .sqs
            .create_queue()
            .queue_name(name)
            .send()
            .await
            .map_err(|e| Self::sdk_error("create_queue", e))?;
        let url = response.queue_url().unwrap_or_default().to_string();
        debug!("Created queue {} at {}", name, url);
        Ok(url)
    }

    #[instrument(skip(self))]
    async fn list_topics(&self) -> Result<Vec<TopicInfo>, StorageError> {
        let response = self
            .sns
            .list_topics()
            .send()
            .await
            .map_err(|e| Self::sdk_error("list_topics", e))?;
        Ok(response
            .topics()
            .iter()
            .filter_map(|t| {
                t.topic_arn().map(|arn| TopicInfo {
                    topic_arn: arn.to_string(),
                })
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn create_topic(&self, name: &str) -> Result<String, StorageError> {
        let response = self
            .sns
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(|e| Self::sdk_error("create_topic", e))?;
        let arn = response.topic_arn().unwrap_or_default().to_string();
        debug!("Created topic {}", arn);
        Ok(arn)
    }
}
