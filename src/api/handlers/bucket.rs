//! Bucket-level handlers: LIST, CREATE, DELETE

use super::AppState;
use crate::api::errors::ApiError;
use crate::api::json::{body_or_default, CreateBucketRequest, MessageResponse};
use crate::types::BucketInfo;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use tracing::{info, instrument};

/// LIST buckets handler
/// GET /api/s3/buckets
#[instrument(skip(state))]
pub async fn list_buckets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BucketInfo>>, ApiError> {
    let buckets = state
        .backend
        .list_buckets()
        .await
        .map_err(ApiError::backend("Error listing buckets"))?;
    Ok(Json(buckets))
}

/// CREATE bucket handler
/// POST /api/s3/buckets
///
/// The name is not checked here; the backend owns the naming rules. A body that
/// is not usable JSON counts as an empty name.
#[instrument(skip(state, payload))]
pub async fn create_bucket(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateBucketRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = body_or_default(payload);
    info!("CREATE bucket {}", request.bucket_name);

    state
        .backend
        .create_bucket(&request.bucket_name)
        .await
        .map_err(ApiError::backend("Error creating bucket"))?;

    Ok(Json(MessageResponse {
        message: "Bucket created successfully",
    }))
}

/// DELETE bucket handler
/// DELETE /api/s3/buckets/:bucketName
///
/// No emptiness check here; whether a non-empty bucket goes away is backend policy.
#[instrument(skip(state))]
pub async fn delete_bucket(
    State(state): State<Arc<AppState>>,
    Path(bucket): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("DELETE bucket {}", bucket);

    state
        .backend
        .delete_bucket(&bucket)
        .await
        .map_err(ApiError::backend("Error deleting bucket"))?;

    Ok(Json(MessageResponse {
        message: "Bucket deleted successfully",
    }))
}
