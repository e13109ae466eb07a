//! Lambda, SQS and SNS passthrough handlers

use super::AppState;
use crate::api::errors::ApiError;
use crate::api::json::{
    body_or_default, CreateQueueRequest, CreateTopicRequest, QueueCreatedResponse,
    TopicCreatedResponse,
};
use crate::types::{FunctionInfo, TopicInfo};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::{info, instrument};

/// GET /api/lambda/functions
#[instrument(skip(state))]
pub async fn list_functions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FunctionInfo>>, ApiError> {
    let functions = state
        .backend
        .list_functions()
        .await
        .map_err(ApiError::backend("Error listing Lambda functions"))?;
    Ok(Json(functions))
}

/// GET /api/sqs/queues
#[instrument(skip(state))]
pub async fn list_queues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let urls = state
        .backend
        .list_queues()
        .await
        .map_err(ApiError::backend("Error listing queues"))?;
    Ok(Json(urls))
}

/// POST /api/sqs/queues
#[instrument(skip(state, payload))]
pub async fn create_queue(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateQueueRequest>, JsonRejection>,
) -> Result<Json<QueueCreatedResponse>, ApiError> {
    let request = body_or_default(payload);
    info!("CREATE queue {}", request.queue_name);
    let queue_url = state
        .backend
        .create_queue(&request.queue_name)
        .await
        .map_err(ApiError::backend("Error creating queue"))?;

    Ok(Json(QueueCreatedResponse {
        message: "Queue created successfully",
        queue_url,
    }))
}

/// GET /api/sns/topics
#[instrument(skip(state))]
pub async fn list_topics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TopicInfo>>, ApiError> {
    let topics = state
        .backend
        .list_topics()
        .await
        .map_err(ApiError::backend("Error listing topics"))?;
    Ok(Json(topics))
}

/// POST /api/sns/topics
#[instrument(skip(state, payload))]
pub async fn create_topic(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTopicRequest>, JsonRejection>,
) -> Result<Json<TopicCreatedResponse>, ApiError> {
    let request = body_or_default(payload);
    info!("CREATE topic {}", request.topic_name);
    let topic_arn = state
        .backend
        .create_topic(&request.topic_name)
        .await
        .map_err(ApiError::backend("Error creating topic"))?;

    Ok(Json(TopicCreatedResponse {
        message: "Topic created successfully",
        topic_arn,
    }))
}
