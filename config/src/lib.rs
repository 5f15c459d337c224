//! # Configuration System
//!
//! Centralized configuration management for the ingestion service.
//!
//! This crate provides:
//! - Configuration structures with serde defaults
//! - Environment variable loading (12-factor app principles) into sparse overrides
//! - Configuration file loading (TOML/YAML)
//! - Configuration precedence (CLI > env > file > defaults)
//! - Configuration validation

pub mod config;
pub mod file_loader;
pub mod loader;
pub mod overrides;
pub mod precedence;
pub mod validation;

pub use config::{
    Config, GeoConfig, LISTEN_HOST, LogConfig, MetricsConfig, ServerConfig,
    SynchronizationServiceConfig,
};
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use loader::{load_from_env, load_overrides_from_env};
pub use overrides::ConfigOverrides;
pub use precedence::merge_configs;
pub use validation::validate;
