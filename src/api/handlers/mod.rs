//! Gateway request handlers
//!
//! Split into submodules by domain:
//! - `bucket`: bucket listing, creation and deletion
//! - `object`: object listing, upload and deletion within a bucket
//! - `services`: Lambda, SQS and SNS passthroughs
//! - `status`: health check

mod bucket;
mod object;
mod services;
mod status;

use crate::metrics::Metrics;
use crate::storage::CloudBackend;
use std::sync::Arc;

pub use bucket::{create_bucket, delete_bucket, list_buckets};
pub use object::{delete_object, list_objects, upload_object};
pub use services::{create_queue, create_topic, list_functions, list_queues, list_topics};
pub use status::{health_check, HealthResponse};

/// Application state shared across handlers. Built once at startup, read-only afterwards.
pub struct AppState {
    pub backend: Arc<dyn CloudBackend>,
    /// Cap on a single uploaded file, in bytes
    pub max_upload_size: u64,
    pub metrics: Option<Metrics>,
}
