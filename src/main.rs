//! Emulator Gateway - JSON HTTP façade over a local cloud-emulation backend

use clap::Parser;
use emulator_gateway::api::{self, handlers::AppState};
use emulator_gateway::config::{BackendConfig, Config};
use emulator_gateway::metrics::Metrics;
use emulator_gateway::storage;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Emulator Gateway - REST front end for LocalStack-style emulators
#[derive(Parser, Debug)]
#[command(name = "emulator_gateway")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// Static asset directory (overrides config)
    #[arg(short, long, value_name = "DIR")]
    static_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing .env is the normal case
    dotenvy::dotenv().ok();

    // Load configuration from file if specified, otherwise use default loading
    let mut config = if let Some(ref path) = cli.config {
        Config::from_file(path)?
    } else {
        Config::load()
    };

    // CLI overrides
    if let Some(ref addr) = cli.listen {
        config.listen_addr = addr.parse()?;
    }
    if let Some(ref dir) = cli.static_dir {
        config.static_dir = dir.into();
    }

    // Initialize tracing
    let log_level = if cli.verbose {
        "emulator_gateway=trace,tower_http=trace".to_string()
    } else {
        config.log_level.clone()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Emulator Gateway");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Static assets: {}", config.static_dir.display());
    info!("  Max upload size: {} bytes", config.max_upload_size);

    match &config.backend {
        BackendConfig::Aws {
            endpoint, region, ..
        } => {
            info!("  Backend: AWS-compatible emulator (path-style addressing)");
            info!("  Endpoint: {}", endpoint);
            info!("  Region: {}", region);
        }
        BackendConfig::Memory { region } => {
            info!("  Backend: in-memory (region {})", region);
        }
    }

    match config.auth_token {
        Some(ref token) => info!("  LocalStack auth token: set ({} chars)", token.len()),
        None => info!("  LocalStack auth token: not set"),
    }
    if let Some(secs) = config.request_timeout_secs {
        info!("  Request timeout: {}s", secs);
    }
    if !config.static_dir.is_dir() {
        warn!(
            "  Static directory {} does not exist; only the API will be served",
            config.static_dir.display()
        );
    }

    let backend = storage::build_backend(&config.backend)?;
    let metrics = match Metrics::new() {
        Ok(m) => Some(m),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };

    let state = Arc::new(AppState {
        backend,
        max_upload_size: config.max_upload_size,
        metrics,
    });
    let app = api::router(state, &config);

    // Start server with graceful shutdown
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("Emulator Gateway listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
