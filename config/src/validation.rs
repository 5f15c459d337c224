//! # Configuration Validation
//!
//! Provides validation for all configuration structures using the `validator` crate.

use crate::config::Config;
use errors::ConfigError;
use validator::Validate;

/// Validate configuration structure.
///
/// ## Validation Rules
/// - `server.port`, `port`: 1-65535
/// - `server.auth_reload_sec`, `server.destinations_reload_sec`: 1-86400
/// - `geo.maxmind_path`: non-empty
/// - `log.rotation_min`: at least 1
/// - `log.level`: "trace", "debug", "info", "warn" or "error"
/// - `synchronization_service.connection_timeout_seconds`: 1-300
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    config.validate().map_err(|e| ConfigError::Invalid {
        reason: e.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_zero_port_override() {
        let config = Config {
            port: Some(0),
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.log.level = "verbose".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_empty_maxmind_path() {
        let mut config = Config::default();
        config.geo.maxmind_path = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rotation() {
        let mut config = Config::default();
        config.log.rotation_min = 0;
        assert!(validate(&config).is_err());
    }
}
