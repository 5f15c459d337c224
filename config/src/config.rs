//! # Configuration Structures
//!
//! This module defines all configuration structures for the ingestion
//! service.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization
//! - Use `validator` for input validation
//! - Carry their defaults as `default_*` functions shared by serde and `Default`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Main configuration structure for the ingestion service.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Aggregates every setting the application registry reads at startup:
/// HTTP server, geo database, logging, metrics, and the synchronization
/// service.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// println!("Listening on {}", config.authority());
/// ```
///
/// ## Fields
/// - `server`: HTTP server, identity and authorization settings
/// - `geo`: MaxMind database location
/// - `log`: Log file location, rotation and stdout mirroring
/// - `metrics`: Prometheus exporter toggle
/// - `synchronization_service`: Coordination service timeouts
/// - `port`: Optional listen port that wins over `server.port`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    #[serde(default)]
    #[validate(nested)]
    pub geo: GeoConfig,

    #[serde(default)]
    #[validate(nested)]
    pub log: LogConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    #[validate(nested)]
    pub synchronization_service: SynchronizationServiceConfig,

    /// Listen port override
    #[serde(default)]
    #[validate(range(min = 1, max = 65535))]
    pub port: Option<u16>
}

impl Config {
    /// Effective listen port: the `port` override, else `server.port`.
    pub fn listen_port(&self) -> u16 {
        self.port.unwrap_or(self.server.port)
    }

    /// Externally visible listen address (`host:port`).
    pub fn authority(&self) -> String {
        format!("{}:{}", LISTEN_HOST, self.listen_port())
    }
}

/// Host every listener binds to.
pub const LISTEN_HOST: &str = "0.0.0.0";

/// HTTP server configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Fields
/// - `name`: Server name; when unset it is bootstrapped from `identity_file`
/// - `port`: Listen port (default: 8001)
/// - `static_files_dir`: Directory served under `/s` (default: "./web")
/// - `auth_reload_sec`: Token file reload period (default: 30)
/// - `destinations_reload_sec`: Destinations reload period (default: 40)
/// - `public_url`: Public URL; when unset the Host header is used
/// - `identity_file`: Persisted server name record (default: "/resources/server.name")
/// - `auth`: Static API tokens
/// - `auth_file`: JSON array of API tokens, reloaded periodically
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_server_port")]
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    #[serde(default = "default_static_files_dir")]
    pub static_files_dir: PathBuf,

    #[serde(default = "default_auth_reload_sec")]
    #[validate(range(min = 1, max = 86400))]
    pub auth_reload_sec: u64,

    #[serde(default = "default_destinations_reload_sec")]
    #[validate(range(min = 1, max = 86400))]
    pub destinations_reload_sec: u64,

    #[serde(default)]
    pub public_url: Option<String>,

    #[serde(default = "default_identity_file")]
    pub identity_file: PathBuf,

    #[serde(default)]
    pub auth: Vec<String>,

    #[serde(default)]
    pub auth_file: Option<PathBuf>
}

fn default_server_port() -> u16 {
    8001
}

fn default_static_files_dir() -> PathBuf {
    PathBuf::from("./web")
}

fn default_auth_reload_sec() -> u64 {
    30
}

fn default_destinations_reload_sec() -> u64 {
    40
}

fn default_identity_file() -> PathBuf {
    PathBuf::from("/resources/server.name")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: None,
            port: default_server_port(),
            static_files_dir: default_static_files_dir(),
            auth_reload_sec: default_auth_reload_sec(),
            destinations_reload_sec: default_destinations_reload_sec(),
            public_url: None,
            identity_file: default_identity_file(),
            auth: Vec::new(),
            auth_file: None
        }
    }
}

/// Geo database configuration.
///
/// `maxmind_path` is either a `.mmdb` file or a directory containing
/// `GeoLite2-City.mmdb`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct GeoConfig {
    #[serde(default = "default_maxmind_path")]
    #[validate(length(min = 1))]
    pub maxmind_path: String
}

fn default_maxmind_path() -> String {
    "/home/eventnative/app/res/".to_string()
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            maxmind_path: default_maxmind_path()
        }
    }
}

/// Logging configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Fields
/// - `path`: Directory for log files; empty disables file output
/// - `show_in_server`: Mirror log lines to stdout (default: false)
/// - `rotation_min`: Rotation period in minutes (default: 5)
/// - `level`: Default filter when `RUST_LOG` is unset (default: "info")
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default)]
    pub show_in_server: bool,

    #[serde(default = "default_rotation_min")]
    #[validate(range(min = 1))]
    pub rotation_min: u64,

    #[serde(default = "default_log_level")]
    #[validate(custom(function = "validate_log_level"))]
    pub level: String
}

fn default_log_path() -> String {
    "/home/eventnative/logs/events".to_string()
}

fn default_rotation_min() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn validate_log_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid log level"))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            show_in_server: false,
            rotation_min: default_rotation_min(),
            level: default_log_level()
        }
    }
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool
}

/// Synchronization service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SynchronizationServiceConfig {
    #[serde(default = "default_connection_timeout_seconds")]
    #[validate(range(min = 1, max = 300))]
    pub connection_timeout_seconds: u64
}

fn default_connection_timeout_seconds() -> u64 {
    20
}

impl Default for SynchronizationServiceConfig {
    fn default() -> Self {
        Self {
            connection_timeout_seconds: default_connection_timeout_seconds()
        }
    }
}
