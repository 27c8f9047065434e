//! Crucible hub server
//!
//! Main entry point for the hub HTTP server. Opens the local registry under
//! the archive root and serves the API until SIGINT/SIGTERM.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use hub_api::{build_api_server_with_config, MiddlewareConfig};
use hub_registry::LocalRegistry;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use config::ServerConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(short, long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT", default_value = "development")]
    environment: String,

    /// Server host
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Server port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Directory for archives and the catalog index
    #[arg(long, env = "ARCHIVE_ROOT")]
    archive_root: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

impl Args {
    /// Apply command-line overrides on top of loaded configuration
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(archive_root) = self.archive_root {
            config.storage.archive_root = archive_root;
        }
        if let Some(log_level) = self.log_level {
            config.logging.level = log_level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let environment = args.environment.clone();

    let mut config = ServerConfig::load(&args.config_dir, &environment)
        .with_context(|| format!("Failed to load configuration from {}", args.config_dir))?;
    args.apply(&mut config);

    telemetry::init_with_config(telemetry::TelemetryConfig::from(&config.logging))?;

    info!("Starting hub server");
    info!("Environment: {}", environment);
    info!("Archive root: {}", config.storage.archive_root.display());

    let registry = LocalRegistry::open(&config.storage.archive_root)
        .await
        .context("Failed to open registry")?;

    let middleware = MiddlewareConfig::new().with_tracing(config.http.request_tracing);
    let app = build_api_server_with_config(Arc::new(registry), middleware);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("Invalid HTTP bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind HTTP server")?;
    info!("HTTP Server listening on http://{}", listener.local_addr()?);

    if config.server.graceful_shutdown {
        serve_with_shutdown(
            listener,
            app,
            Duration::from_secs(config.server.shutdown_timeout_seconds),
        )
        .await?;
    } else {
        axum::serve(listener, app)
            .await
            .context("HTTP Server error")?;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Serve until a shutdown signal, then drain for at most `timeout`
async fn serve_with_shutdown(listener: TcpListener, app: Router, timeout: Duration) -> Result<()> {
    let token = CancellationToken::new();
    let drain = token.clone();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { drain.cancelled().await })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            return joined
                .context("HTTP Server task panicked")?
                .context("HTTP Server error");
        },
        _ = shutdown_signal() => {},
    }

    info!("Waiting up to {} seconds for in-flight requests", timeout.as_secs());
    token.cancel();

    match tokio::time::timeout(timeout, server).await {
        Ok(joined) => joined
            .context("HTTP Server task panicked")?
            .context("HTTP Server error"),
        Err(_) => {
            warn!("Shutdown timeout elapsed; dropping remaining connections");
            Ok(())
        }
    }
}

/// Graceful shutdown signal handler
///
/// Resolves on SIGTERM or SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
