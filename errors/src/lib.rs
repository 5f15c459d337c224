//! # Ingest Errors
//!
//! Error handling for the fact ingestion service.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields in every variant so log lines stay self-describing
//! - Startup errors (`RegistryError`) are fatal, everything else degrades

use thiserror::Error;

/// Geo resolution errors
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Invalid ip address: {ip}")]
    InvalidIp { ip: String },

    #[error("No geo record for ip: {ip}")]
    NotFound { ip: String },

    #[error("Geo lookup for {ip} failed: {reason}")]
    LookupFailed { ip: String, reason: String },

    #[error("Failed to open geo database at {path}: {reason}")]
    DatabaseOpen { path: String, reason: String },

    #[error("Geo resolver is unavailable")]
    Unavailable
}

/// Fact preprocessing errors
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String }
}

impl PreprocessError {
    pub fn nil_fact() -> Self {
        Self::InvalidInput {
            reason: "input fact can't be nil".to_string()
        }
    }
}

/// Authorization service errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token source {path} unreadable: {reason}")]
    SourceUnreadable { path: String, reason: String },

    #[error("Token source {path} is malformed: {reason}")]
    SourceMalformed { path: String, reason: String },

    #[error("Token reloader failed to start: {reason}")]
    ReloaderSpawn { reason: String }
}

/// Server identity bootstrap errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity file {path} io failure: {reason}")]
    Io { path: String, reason: String },

    #[error("Identity record serialization failed: {reason}")]
    Serialization { reason: String }
}

/// Resource teardown errors
#[derive(Debug, Error)]
pub enum CloseError {
    #[error("Failed to close {resource}: {reason}")]
    Failed { resource: String, reason: String }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },

    #[error("Configuration source {source_name} failed: {reason}")]
    Source { source_name: String, reason: String }
}

/// Registry (application config) initialization errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Configuration rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("Authorization service init failed: {0}")]
    Authorization(#[from] AuthError),

    #[error("Logging init failed: {reason}")]
    Logging { reason: String }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_fact_message() {
        let err = PreprocessError::nil_fact();
        assert_eq!(err.to_string(), "Invalid input: input fact can't be nil");
    }

    #[test]
    fn test_registry_error_wraps_auth() {
        let err: RegistryError = AuthError::SourceUnreadable {
            path: "/etc/tokens.json".to_string(),
            reason: "permission denied".to_string()
        }
        .into();
        assert!(matches!(err, RegistryError::Authorization(_)));
        assert!(err.to_string().contains("/etc/tokens.json"));
    }
}
