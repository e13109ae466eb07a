//! Configuration for the emulator gateway
//!
//! Read once at startup (TOML file or environment) and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default upload cap for a single multipart file.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Directory served at `/` for the browser UI
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Maximum size in bytes of one uploaded file
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,

    /// Optional per-request timeout. Unset means requests wait on the backend indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Log level filter string. Overridden by RUST_LOG.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// LocalStack auth token. Only reported at startup, never sent anywhere.
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,

    /// Emulation backend
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// AWS-compatible emulation endpoint (LocalStack and friends)
    Aws {
        #[serde(default = "default_endpoint")]
        endpoint: String,

        #[serde(default = "default_region")]
        region: String,

        #[serde(default = "default_credential")]
        access_key_id: String,

        #[serde(default = "default_credential")]
        secret_access_key: String,
    },

    /// In-process emulation, for development without a running emulator and for tests
    Memory {
        #[serde(default = "default_region")]
        region: String,
    },
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_max_upload_size() -> u64 {
    DEFAULT_MAX_UPLOAD_SIZE
}

fn default_log_level() -> String {
    "emulator_gateway=debug,tower_http=debug".to_string()
}

fn default_endpoint() -> String {
    "http://192.168.0.108:4566".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_credential() -> String {
    "test".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Aws {
            endpoint: default_endpoint(),
            region: default_region(),
            access_key_id: default_credential(),
            secret_access_key: default_credential(),
        }
    }
}

impl BackendConfig {
    /// Short label for logs and /health
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Aws { .. } => "aws",
            BackendConfig::Memory { .. } => "memory",
        }
    }

    /// Apply the standard AWS_* environment variables on top of this backend.
    /// Only meaningful for the AWS backend; the memory backend only picks up the region.
    fn apply_aws_env(&mut self, vars: &impl Fn(&str) -> Option<String>) {
        match self {
            BackendConfig::Aws {
                endpoint,
                region,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if let Some(v) = vars("AWS_ENDPOINT") {
                    *endpoint = v;
                }
                if let Some(v) = vars("AWS_REGION") {
                    *region = v;
                }
                if let Some(v) = vars("AWS_ACCESS_KEY_ID") {
                    *access_key_id = v;
                }
                if let Some(v) = vars("AWS_SECRET_ACCESS_KEY") {
                    *secret_access_key = v;
                }
            }
            BackendConfig::Memory { region } => {
                if let Some(v) = vars("AWS_REGION") {
                    *region = v;
                }
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            static_dir: default_static_dir(),
            max_upload_size: default_max_upload_size(),
            request_timeout_secs: None,
            log_level: default_log_level(),
            auth_token: None,
            backend: BackendConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. The `AWS_*` and `LOCALSTACK_AUTH_TOKEN`
    /// variables still apply on top of the file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content, env_var)
    }

    /// Parse TOML, then apply the environment overrides from `vars`
    pub fn from_toml(
        content: &str,
        vars: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.backend.apply_aws_env(&vars);
        if let Some(token) = vars("LOCALSTACK_AUTH_TOKEN") {
            config.auth_token = Some(token);
        }
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(env_var)
    }

    /// Build a config from an arbitrary variable lookup (the process environment in production).
    pub fn from_vars(vars: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = vars("EGW_LISTEN_ADDR") {
            if let Ok(parsed) = addr.parse() {
                config.listen_addr = parsed;
            }
        }

        if let Some(dir) = vars("EGW_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        if let Some(size) = vars("EGW_MAX_UPLOAD_SIZE") {
            if let Ok(parsed) = size.parse() {
                config.max_upload_size = parsed;
            }
        }

        if let Some(secs) = vars("EGW_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = secs.parse().ok().filter(|s| *s > 0);
        }

        if let Some(level) = vars("EGW_LOG_LEVEL") {
            config.log_level = level;
        }

        if vars("EGW_BACKEND").as_deref() == Some("memory") {
            config.backend = BackendConfig::Memory {
                region: default_region(),
            };
        }
        config.backend.apply_aws_env(&vars);

        config.auth_token = vars("LOCALSTACK_AUTH_TOKEN");

        config
    }

    /// Load configuration from file if one is found, otherwise from environment
    pub fn load() -> Self {
        if let Some(path) = env_var("EGW_CONFIG") {
            match Self::from_file(&path) {
                Ok(config) => return config,
                Err(e) => eprintln!("Ignoring config file {}: {}", path, e),
            }
        }

        let path = "emulator_gateway.toml";
        if std::path::Path::new(path).exists() {
            match Self::from_file(path) {
                Ok(config) => return config,
                Err(e) => eprintln!("Ignoring config file {}: {}", path, e),
            }
        }

        Self::from_env()
    }

    /// Body limit for the upload route: the file cap plus room for the multipart envelope
    /// (boundaries, part headers, any small text fields sent alongside the file).
    pub fn upload_body_limit(&self) -> usize {
        const ENVELOPE_ALLOWANCE: u64 = 64 * 1024;
        usize::try_from(self.max_upload_size.saturating_add(ENVELOPE_ALLOWANCE))
            .unwrap_or(usize::MAX)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
