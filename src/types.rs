//! Descriptors exchanged with the emulation backend
//!
//! Field names follow the AWS wire shapes (PascalCase) since the browser UI
//! consumes them as the backend reports them.

use crate::keys;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bucket as reported by ListBuckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
}

/// One entry of a single-page object listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListedObject {
    /// Raw key, exactly as stored
    pub key: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(rename = "ETag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

/// A listed object augmented with its display and transport forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectEntry {
    #[serde(flatten)]
    pub object: ListedObject,
    /// Best-effort human-readable name. Not an identifier.
    pub display_name: String,
    /// Percent-encoded key; decodes back to `Key` exactly
    pub encoded_key: String,
}

impl From<ListedObject> for ObjectEntry {
    fn from(object: ListedObject) -> Self {
        Self {
            display_name: keys::display_name(&object.key),
            encoded_key: keys::encode_key(&object.key),
            object,
        }
    }
}

/// A function as reported by Lambda ListFunctions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionInfo {
    pub function_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub code_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// A topic as reported by SNS ListTopics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicInfo {
    pub topic_arn: String,
}
