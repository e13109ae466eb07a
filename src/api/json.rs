//! Request and response bodies of the JSON API

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// POST /api/s3/buckets
#[derive(Debug, Default, Deserialize)]
pub struct CreateBucketRequest {
    /// Passed to the backend untouched; an absent name becomes "" and the backend rejects it
    #[serde(rename = "bucketName", default)]
    pub bucket_name: String,
}

/// POST /api/sqs/queues
#[derive(Debug, Default, Deserialize)]
pub struct CreateQueueRequest {
    #[serde(rename = "queueName", default)]
    pub queue_name: String,
}

/// POST /api/sns/topics
#[derive(Debug, Default, Deserialize)]
pub struct CreateTopicRequest {
    #[serde(rename = "topicName", default)]
    pub topic_name: String,
}

/// Unwrap a JSON request body, treating an unusable one as empty.
///
/// A body without a JSON content type, with malformed JSON or with a mistyped
/// field yields `T::default()`. The empty name then reaches the backend, which
/// refuses it, so the client sees the route's usual `{"error": ...}` response.
pub fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Unusable JSON body ({}): {}", rejection.status(), rejection.body_text());
            T::default()
        }
    }
}

/// `{"message": ...}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Response of POST /api/sqs/queues
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueCreatedResponse {
    pub message: &'static str,
    pub queue_url: String,
}

/// Response of POST /api/sns/topics
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCreatedResponse {
    pub message: &'static str,
    pub topic_arn: String,
}

/// `{"error": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    async fn extract<T>(request: Request<Body>) -> T
    where
        T: Default + serde::de::DeserializeOwned,
    {
        body_or_default(Json::<T>::from_request(request, &()).await)
    }

    fn json_post(body: &'static str) -> Request<Body> {
        Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_is_used() {
        let req: CreateBucketRequest = extract(json_post(r#"{"bucketName":"b1"}"#)).await;
        assert_eq!(req.bucket_name, "b1");
    }

    #[tokio::test]
    async fn test_unusable_bodies_fall_back_to_empty() {
        let no_content_type = Request::post("/")
            .body(Body::from(r#"{"bucketName":"b1"}"#))
            .unwrap();
        let req: CreateBucketRequest = extract(no_content_type).await;
        assert_eq!(req.bucket_name, "");

        let req: CreateQueueRequest = extract(json_post("{not json")).await;
        assert_eq!(req.queue_name, "");

        let req: CreateTopicRequest = extract(json_post(r#"{"topicName":5}"#)).await;
        assert_eq!(req.topic_name, "");
    }

    #[test]
    fn test_request_field_names() {
        let req: CreateBucketRequest = serde_json::from_str(r#"{"bucketName":"b1"}"#).unwrap();
        assert_eq!(req.bucket_name, "b1");
        let req: CreateBucketRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.bucket_name, "");
        let req: CreateQueueRequest = serde_json::from_str(r#"{"queueName":"q"}"#).unwrap();
        assert_eq!(req.queue_name, "q");
        let req: CreateTopicRequest = serde_json::from_str(r#"{"topicName":"t"}"#).unwrap();
        assert_eq!(req.topic_name, "t");
    }

    #[test]
    fn test_created_response_field_names() {
        let json = serde_json::to_value(QueueCreatedResponse {
            message: "Queue created successfully",
            queue_url: "http://q".to_string(),
        })
        .unwrap();
        assert_eq!(json["queueUrl"], "http://q");

        let json = serde_json::to_value(TopicCreatedResponse {
            message: "Topic created successfully",
            topic_arn: "arn:t".to_string(),
        })
        .unwrap();
        assert_eq!(json["topicArn"], "arn:t");
    }
}
