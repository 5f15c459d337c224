//! # Registry
//!
//! Application-wide registry for the ingestion service.
//!
//! This crate provides:
//! - `AppConfig`: resolved settings, shared resolvers and shutdown ordering
//! - Server identity bootstrap from the on-disk record
//! - Global logger installation with rolling log files

pub mod app_config;
pub mod identity;
pub mod logging;

pub use app_config::AppConfig;
pub use identity::{DEFAULT_SERVER_NAME, ResolvedIdentity, ServerIdentityRecord, resolve_server_name};
pub use logging::{LogGuard, init_global_logger};
