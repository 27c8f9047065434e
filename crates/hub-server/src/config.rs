//! Server configuration
//!
//! Configuration is layered, later sources overriding earlier ones:
//! - `{config_dir}/default.toml`
//! - `{config_dir}/{environment}.toml`
//! - `HUB_*` environment variables (`__` separates sections)
//! - command-line arguments

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listener settings
    #[serde(default)]
    pub server: HttpServerConfig,

    /// Archive storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// HTTP middleware
    #[serde(default)]
    pub http: HttpConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Drain in-flight requests on SIGINT/SIGTERM
    #[serde(default = "default_true")]
    pub graceful_shutdown: bool,

    /// How long to wait for in-flight requests before exiting
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_shutdown_timeout() -> u64 {
    5
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            graceful_shutdown: default_true(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

/// Archive storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding archives and the catalog index
    #[serde(default = "default_archive_root")]
    pub archive_root: PathBuf,
}

fn default_archive_root() -> PathBuf {
    PathBuf::from("./archives")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            archive_root: default_archive_root(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON formatting
    #[serde(default)]
    pub json_format: bool,

    /// Include target module
    #[serde(default = "default_true")]
    pub include_target: bool,

    /// Include thread IDs
    #[serde(default)]
    pub include_thread_ids: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            include_target: true,
            include_thread_ids: false,
        }
    }
}

/// HTTP middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Emit a span per request
    #[serde(default = "default_true")]
    pub request_tracing: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_tracing: default_true(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from files and environment
    ///
    /// Missing files are skipped. Environment variables use the `HUB`
    /// prefix, e.g. `HUB_SERVER__PORT=9090` or
    /// `HUB_STORAGE__ARCHIVE_ROOT=/var/lib/hub`.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or parsed
    pub fn load(config_dir: impl Into<PathBuf>, environment: &str) -> Result<Self, ConfigError> {
        let config_dir = config_dir.into();

        Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", environment))).required(false),
            )
            .add_source(
                Environment::with_prefix("HUB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
