//! Shared test infrastructure for integration tests
//!
//! Provides TestServer (in-memory and LocalStack backends), request helpers,
//! and LocalStack availability gating.

#![allow(dead_code)]

use emulator_gateway::api::json::ErrorBody;
use reqwest::multipart::{Form, Part};
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Port counter to avoid conflicts between tests.
static PORT_COUNTER: AtomicU16 = AtomicU16::new(23000);

/// LocalStack configuration constants
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
pub const LOCALSTACK_ADDR: &str = "localhost:4566";

/// Exactly the default upload cap
pub const FIVE_MIB: usize = 5 * 1024 * 1024;

/// Contents of the index.html placed in every test server's static directory
pub const INDEX_HTML: &str = "<html><body>emulator console</body></html>";

/// Test server wrapper that spawns a real emulator_gateway binary
pub struct TestServer {
    process: Child,
    port: u16,
    _dir: TempDir,
}

impl TestServer {
    // ── Factory methods ──

    /// Start a test server with the in-memory backend (no emulator needed)
    pub async fn memory() -> Self {
        Self::spawn_with_config("[backend]\ntype = \"memory\"\n").await
    }

    /// Start a test server against a running LocalStack
    pub async fn localstack() -> Self {
        let config = format!(
            concat!(
                "[backend]\n",
                "type = \"aws\"\n",
                "endpoint = \"{}\"\n",
                "region = \"us-east-1\"\n",
                "access_key_id = \"test\"\n",
                "secret_access_key = \"test\"\n",
            ),
            LOCALSTACK_ENDPOINT
        );
        Self::spawn_with_config(&config).await
    }

    /// Start a test server whose backend endpoint refuses connections
    pub async fn unreachable_backend() -> Self {
        let config = concat!(
            "[backend]\n",
            "type = \"aws\"\n",
            "endpoint = \"http://127.0.0.1:1\"\n",
        );
        Self::spawn_with_config(config).await
    }

    // ── Shared spawn logic ──

    /// Allocate a port, write a TOML config and a static directory, spawn the
    /// gateway and wait for readiness. All factory methods delegate here.
    async fn spawn_with_config(config_body: &str) -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = TempDir::new().expect("Failed to create temp dir");

        let static_dir = dir.path().join("public");
        std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
        std::fs::write(static_dir.join("index.html"), INDEX_HTML)
            .expect("Failed to write index.html");

        let full_config = format!(
            "listen_addr = \"127.0.0.1:{}\"\nstatic_dir = \"{}\"\n{}",
            port,
            static_dir.display(),
            config_body
        );
        let config_path = dir.path().join("test.toml");
        std::fs::write(&config_path, &full_config).expect("Failed to write test config");

        let process = Command::new(env!("CARGO_BIN_EXE_emulator_gateway"))
            .arg("--config")
            .arg(&config_path)
            .env("RUST_LOG", "emulator_gateway=warn")
            // The config file is the whole story; ambient AWS settings would override it
            .env_remove("AWS_ENDPOINT")
            .env_remove("AWS_REGION")
            .env_remove("AWS_ACCESS_KEY_ID")
            .env_remove("AWS_SECRET_ACCESS_KEY")
            .spawn()
            .expect("Failed to start server");

        let mut server = Self {
            process,
            port,
            _dir: dir,
        };
        server.wait_ready().await;
        server
    }

    // ── Instance methods ──

    async fn wait_ready(&mut self) {
        let addr = format!("127.0.0.1:{}", self.port);
        for _ in 0..150 {
            if std::net::TcpStream::connect(&addr).is_ok() {
                return;
            }

            if let Ok(Some(status)) = self.process.try_wait() {
                panic!("Server exited before becoming ready: {}", status);
            }

            sleep(Duration::from_millis(100)).await;
        }

        let _ = self.process.kill();
        panic!("Timed out waiting for server on {}", addr);
    }

    /// Get the HTTP endpoint URL
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Build a full URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint(), path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

// === Shared HTTP helpers (reqwest) ===

/// POST /api/s3/buckets and assert success.
pub async fn create_bucket(client: &reqwest::Client, server: &TestServer, bucket: &str) {
    let resp = client
        .post(server.url("/api/s3/buckets"))
        .json(&serde_json::json!({ "bucketName": bucket }))
        .send()
        .await
        .expect("create bucket failed");
    assert_eq!(resp.status().as_u16(), 200, "create bucket {}", bucket);
}

/// GET /api/s3/buckets and return the bucket names.
pub async fn bucket_names(client: &reqwest::Client, server: &TestServer) -> Vec<String> {
    let resp = client
        .get(server.url("/api/s3/buckets"))
        .send()
        .await
        .expect("list buckets failed");
    assert_eq!(resp.status().as_u16(), 200);
    let body: Vec<serde_json::Value> = resp.json().await.unwrap();
    body.iter()
        .map(|b| b["Name"].as_str().unwrap().to_string())
        .collect()
}

/// Upload one file through the multipart route and return the response.
pub async fn upload(
    client: &reqwest::Client,
    server: &TestServer,
    bucket: &str,
    file_name: &str,
    data: Vec<u8>,
    content_type: &str,
) -> reqwest::Response {
    let part = Part::bytes(data)
        .file_name(file_name.to_string())
        .mime_str(content_type)
        .unwrap();
    let form = Form::new().part("file", part);
    client
        .post(server.url(&format!("/api/s3/{}/upload", bucket)))
        .multipart(form)
        .send()
        .await
        .expect("upload failed")
}

/// GET /api/s3/:bucket/files and return the parsed entries.
pub async fn list_files(
    client: &reqwest::Client,
    server: &TestServer,
    bucket: &str,
) -> Vec<serde_json::Value> {
    let resp = client
        .get(server.url(&format!("/api/s3/{}/files", bucket)))
        .send()
        .await
        .expect("list files failed");
    assert_eq!(resp.status().as_u16(), 200);
    resp.json().await.unwrap()
}

/// Read an `{"error": ...}` body.
pub async fn error_message(resp: reqwest::Response) -> String {
    let body: ErrorBody = resp.json().await.expect("error body is JSON");
    body.error
}

/// Deterministic payload of `size` bytes
pub fn payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Unique-ish bucket name for tests sharing a LocalStack instance
pub fn unique_bucket(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("{}-{}-{}", prefix, std::process::id(), nanos)
}

// === LocalStack gating ===

/// Check if LocalStack is listening
pub fn localstack_available() -> bool {
    std::net::TcpStream::connect(LOCALSTACK_ADDR).is_ok()
}

/// Macro to skip a test if LocalStack is not available.
/// Use at the start of any test that requires LocalStack.
#[macro_export]
macro_rules! skip_unless_localstack {
    () => {
        if !common::localstack_available() {
            eprintln!("LocalStack not available, skipping test");
            return;
        }
    };
}
