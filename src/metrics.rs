//! Prometheus metrics for the gateway.
//!
//! All metric types use atomics internally (no locks on the hot path).
//! The `Metrics` struct is `Clone`-cheap (Arc-based registry + Arc-based collectors).

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
    TEXT_FORMAT,
};
use std::sync::Arc;
use std::time::Instant;

use crate::api::handlers::AppState;

/// All Prometheus metrics for the gateway.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    pub process_start_time_seconds: Gauge,

    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,

    /// 5xx responses by operation; in this gateway every 5xx is a failed backend call
    pub backend_errors_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let process_start_time_seconds =
            Gauge::new("process_start_time_seconds", "Start time of the process")?;
        registry.register(Box::new(process_start_time_seconds.clone()))?;

        #[cfg(target_os = "linux")]
        {
            let pc = prometheus::process_collector::ProcessCollector::for_self();
            let _ = registry.register(Box::new(pc));
        }

        let http_requests_total = IntCounterVec::new(
            Opts::new(
                "gateway_http_requests_total",
                "Total HTTP requests by method, status, and operation",
            ),
            &["method", "status", "operation"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "gateway_http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "operation"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let backend_errors_total = IntCounterVec::new(
            Opts::new(
                "gateway_backend_errors_total",
                "Backend calls that failed, by operation",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(backend_errors_total.clone()))?;

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        process_start_time_seconds.set(now);

        Ok(Self {
            registry,
            process_start_time_seconds,
            http_requests_total,
            http_request_duration_seconds,
            backend_errors_total,
        })
    }
}

/// Classify a request into a bounded operation label.
pub fn classify_operation(method: &str, path: &str) -> &'static str {
    match path {
        "/health" => return "health",
        "/metrics" => return "metrics",
        _ => {}
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, segments.as_slice()) {
        ("GET", ["api", "s3", "buckets"]) => "list_buckets",
        ("POST", ["api", "s3", "buckets"]) => "create_bucket",
        ("DELETE", ["api", "s3", "buckets", _]) => "delete_bucket",
        ("GET", ["api", "s3", _, "files"]) => "list_objects",
        ("POST", ["api", "s3", _, "upload"]) => "upload_object",
        ("DELETE", ["api", "s3", _, "files", _]) => "delete_object",
        ("GET", ["api", "lambda", "functions"]) => "list_functions",
        ("GET", ["api", "sqs", "queues"]) => "list_queues",
        ("POST", ["api", "sqs", "queues"]) => "create_queue",
        ("GET", ["api", "sns", "topics"]) => "list_topics",
        ("POST", ["api", "sns", "topics"]) => "create_topic",
        (_, ["api", ..]) => "unknown",
        ("GET", _) | ("HEAD", _) => "static",
        _ => "unknown",
    }
}

/// Axum middleware that records HTTP request metrics.
pub async fn http_metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let metrics = match &state.metrics {
        Some(m) => m,
        None => return next.run(request).await,
    };

    let method = request.method().to_string();
    let operation = classify_operation(&method, request.uri().path());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status();
    metrics
        .http_requests_total
        .with_label_values(&[&method, status.as_str(), operation])
        .inc();
    metrics
        .http_request_duration_seconds
        .with_label_values(&[&method, operation])
        .observe(duration);
    if status.is_server_error() {
        metrics
            .backend_errors_total
            .with_label_values(&[operation])
            .inc();
    }

    response
}

/// Handler for GET /metrics: Prometheus text format.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = match &state.metrics {
        Some(m) => m,
        None => {
            return (StatusCode::NOT_FOUND, "Metrics not enabled").into_response();
        }
    };

    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", e),
        )
            .into_response();
    }

    (StatusCode::OK, [("content-type", TEXT_FORMAT)], buffer).into_response()
}
