//! Object-level handlers: LIST, UPLOAD, DELETE within one bucket

use super::AppState;
use crate::api::errors::ApiError;
use crate::api::json::MessageResponse;
use crate::api::upload::receive_file;
use crate::types::ObjectEntry;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// LIST objects handler
/// GET /api/s3/:bucket/files
///
/// First page only. Every entry carries `DisplayName` and `EncodedKey` next to
/// the raw key; an empty bucket yields `[]`.
#[instrument(skip(state))]
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
    Path(bucket): Path<String>,
) -> Result<Json<Vec<ObjectEntry>>, ApiError> {
    let objects = state
        .backend
        .list_objects(&bucket)
        .await
        .map_err(ApiError::backend("Error listing files"))?;

    debug!("LIST {} -> {} objects", bucket, objects.len());
    Ok(Json(objects.into_iter().map(ObjectEntry::from).collect()))
}

/// UPLOAD handler
/// POST /api/s3/:bucket/upload (multipart field `file`)
///
/// The client's filename is the key, so re-uploading a name replaces the object.
#[instrument(skip(state, multipart))]
pub async fn upload_object(
    State(state): State<Arc<AppState>>,
    Path(bucket): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let file = receive_file(multipart, state.max_upload_size).await?;
    info!(
        "UPLOAD {}/{} ({} bytes)",
        bucket,
        file.file_name,
        file.data.len()
    );

    state
        .backend
        .put_object(
            &bucket,
            &file.file_name,
            file.data,
            file.content_type.as_deref(),
        )
        .await
        .map_err(ApiError::backend("Error uploading file"))?;

    Ok(Json(MessageResponse {
        message: "File uploaded successfully",
    }))
}

/// DELETE object handler
/// DELETE /api/s3/:bucket/files/:filename
///
/// `filename` is the `EncodedKey` from a listing. The router matches on the raw
/// path, so an encoded `/` stays inside this one segment, and the `Path`
/// extractor percent-decodes it exactly once into the literal key.
#[instrument(skip(state))]
pub async fn delete_object(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("DELETE {}/{}", bucket, key);

    state
        .backend
        .delete_object(&bucket, &key)
        .await
        .map_err(ApiError::backend("Error deleting file"))?;

    Ok(Json(MessageResponse {
        message: "File deleted successfully",
    }))
}
