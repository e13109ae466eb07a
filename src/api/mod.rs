//! JSON HTTP API

mod errors;
pub mod handlers;
pub mod json;
mod upload;

pub use errors::ApiError;
pub use upload::{receive_file, UploadedFile, FILE_FIELD};

use crate::config::Config;
use crate::metrics::{http_metrics_middleware, metrics_handler};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use handlers::*;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the gateway router.
///
/// Routes:
///   GET    /api/s3/buckets                  - list buckets
///   POST   /api/s3/buckets                  - create bucket
///   DELETE /api/s3/buckets/:bucketName      - delete bucket
///   GET    /api/s3/:bucket/files            - list objects
///   POST   /api/s3/:bucket/upload           - upload one file (multipart)
///   DELETE /api/s3/:bucket/files/:filename  - delete object (percent-encoded key)
///   GET    /api/lambda/functions            - list functions
///   GET    /api/sqs/queues                  - list queues
///   POST   /api/sqs/queues                  - create queue
///   GET    /api/sns/topics                  - list topics
///   POST   /api/sns/topics                  - create topic
///   GET    /health, /metrics
/// Anything else is served from the static directory.
pub fn router(state: Arc<AppState>, config: &Config) -> Router {
    let upload_route = post(upload_object).layer(DefaultBodyLimit::max(config.upload_body_limit()));

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/s3/buckets", get(list_buckets).post(create_bucket))
        .route("/api/s3/buckets/:bucketName", delete(delete_bucket))
        .route("/api/s3/:bucket/files", get(list_objects))
        .route("/api/s3/:bucket/upload", upload_route)
        .route("/api/s3/:bucket/files/:filename", delete(delete_object))
        .route("/api/lambda/functions", get(list_functions))
        .route("/api/sqs/queues", get(list_queues).post(create_queue))
        .route("/api/sns/topics", get(list_topics).post(create_topic))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            http_metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    if let Some(secs) = config.request_timeout_secs {
        app = app.layer(TimeoutLayer::new(Duration::from_secs(secs)));
    }

    app.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CloudBackend, MemoryBackend};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const BOUNDARY: &str = "gateway-test-boundary";

    fn app(backend: Arc<MemoryBackend>, max_upload_size: u64) -> Router {
        let config = Config {
            max_upload_size,
            ..Config::default()
        };
        let state = Arc::new(AppState {
            backend,
            max_upload_size,
            metrics: None,
        });
        router(state, &config)
    }

    fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
            b = BOUNDARY
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(bucket: &str, body: Vec<u8>) -> Request<Body> {
        Request::post(format!("/api/s3/{}/upload", bucket))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upload_forwards_content_type() {
        let backend = Arc::new(MemoryBackend::new("us-east-1"));
        backend.create_bucket("docs").await.unwrap();

        let body = multipart_body("file", "page.html", "text/html", b"<p>hi</p>");
        let response = app(backend.clone(), 1024)
            .oneshot(upload_request("docs", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "File uploaded successfully"
        );
        assert_eq!(
            backend.content_type_of("docs", "page.html").as_deref(),
            Some("text/html")
        );
    }

    #[tokio::test]
    async fn test_upload_size_boundary() {
        let backend = Arc::new(MemoryBackend::new("us-east-1"));
        backend.create_bucket("docs").await.unwrap();

        let at_cap = multipart_body("file", "fits.bin", "application/octet-stream", &[7u8; 16]);
        let response = app(backend.clone(), 16)
            .oneshot(upload_request("docs", at_cap))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let over = multipart_body("file", "over.bin", "application/octet-stream", &[7u8; 17]);
        let response = app(backend.clone(), 16)
            .oneshot(upload_request("docs", over))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "File too large");

        let keys: Vec<String> = backend
            .list_objects("docs")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.key)
            .collect();
        assert_eq!(keys, vec!["fits.bin"]);
    }

    #[tokio::test]
    async fn test_delete_decodes_key_once() {
        let backend = Arc::new(MemoryBackend::new("us-east-1"));
        backend.create_bucket("docs").await.unwrap();
        for key in ["a/b c.txt", "100%25.txt"] {
            backend
                .put_object("docs", key, bytes::Bytes::from_static(b"x"), None)
                .await
                .unwrap();
        }

        // "100%25.txt" encodes to "100%2525.txt"; one decode must yield the literal key
        for encoded in ["a%2Fb%20c.txt", "100%2525.txt"] {
            let response = app(backend.clone(), 1024)
                .oneshot(
                    Request::delete(format!("/api/s3/docs/files/{}", encoded))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", encoded);
        }

        assert!(backend.list_objects("docs").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_carries_display_and_encoded_names() {
        let backend = Arc::new(MemoryBackend::new("us-east-1"));
        backend.create_bucket("docs").await.unwrap();
        backend
            .put_object("docs", "my file.txt", bytes::Bytes::from_static(b"abc"), None)
            .await
            .unwrap();

        let response = app(backend, 1024)
            .oneshot(
                Request::get("/api/s3/docs/files")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body[0]["Key"], "my file.txt");
        assert_eq!(body[0]["DisplayName"], "my file.txt");
        assert_eq!(body[0]["EncodedKey"], "my%20file.txt");
        assert_eq!(body[0]["Size"], 3);
    }

    #[tokio::test]
    async fn test_metrics_disabled_is_404() {
        let backend = Arc::new(MemoryBackend::new("us-east-1"));
        let response = app(backend, 1024)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
