//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! A dotted key maps to its upper-cased, underscore-joined form:
//! `server.auth_reload_sec` is read from `SERVER_AUTH_RELOAD_SEC`.

use crate::config::Config;
use crate::overrides::ConfigOverrides;
use errors::ConfigError;
use std::env;
use std::path::PathBuf;

/// Load configuration from environment variables.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Environment variables override file values and defaults but can be
/// overridden by CLI arguments. Unset variables keep the default value;
/// a set but unparsable variable is an error.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_env()?;
///     println!("Port: {}", config.server.port);
///     Ok(())
/// }
/// ```
///
/// ## Environment Variables
/// ### Server (`SERVER_*`)
/// - `SERVER_NAME`: Server name (default: bootstrapped from the identity file)
/// - `SERVER_PORT`: Listen port (default: 8001)
/// - `SERVER_STATIC_FILES_DIR`: Static files directory (default: "./web")
/// - `SERVER_AUTH_RELOAD_SEC`: Token reload period (default: 30)
/// - `SERVER_DESTINATIONS_RELOAD_SEC`: Destinations reload period (default: 40)
/// - `SERVER_PUBLIC_URL`: Public URL (optional)
/// - `SERVER_IDENTITY_FILE`: Identity record path (default: "/resources/server.name")
/// - `SERVER_AUTH`: Comma separated API tokens
/// - `SERVER_AUTH_FILE`: JSON token file (optional)
///
/// ### Other
/// - `GEO_MAXMIND_PATH`: MaxMind database file or directory
/// - `LOG_PATH`, `LOG_SHOW_IN_SERVER`, `LOG_ROTATION_MIN`, `LOG_LEVEL`
/// - `METRICS_ENABLED`
/// - `SYNCHRONIZATION_SERVICE_CONNECTION_TIMEOUT_SECONDS`
/// - `PORT`: Listen port override
pub fn load_from_env() -> Result<Config, ConfigError> {
    Ok(load_overrides_from_env()?.to_config())
}

/// Load the keys actually set in the environment.
///
/// Unlike [`load_from_env`], a variable set to the default value is kept, so
/// it can override a config file during the precedence merge.
pub fn load_overrides_from_env() -> Result<ConfigOverrides, ConfigError> {
    Ok(ConfigOverrides {
        server_name: non_empty_env("SERVER_NAME"),
        server_port: parse_env("SERVER_PORT")?,
        static_files_dir: non_empty_env("SERVER_STATIC_FILES_DIR").map(PathBuf::from),
        auth_reload_sec: parse_env("SERVER_AUTH_RELOAD_SEC")?,
        destinations_reload_sec: parse_env("SERVER_DESTINATIONS_RELOAD_SEC")?,
        public_url: non_empty_env("SERVER_PUBLIC_URL"),
        identity_file: non_empty_env("SERVER_IDENTITY_FILE").map(PathBuf::from),
        auth: non_empty_env("SERVER_AUTH").map(|raw| split_list(&raw)),
        auth_file: non_empty_env("SERVER_AUTH_FILE").map(PathBuf::from),
        maxmind_path: non_empty_env("GEO_MAXMIND_PATH"),
        // An empty LOG_PATH is meaningful: it disables file output.
        log_path: env::var("LOG_PATH").ok(),
        log_show_in_server: parse_bool_env("LOG_SHOW_IN_SERVER")?,
        log_rotation_min: parse_env("LOG_ROTATION_MIN")?,
        log_level: non_empty_env("LOG_LEVEL"),
        metrics_enabled: parse_bool_env("METRICS_ENABLED")?,
        connection_timeout_seconds: parse_env(
            "SYNCHRONIZATION_SERVICE_CONNECTION_TIMEOUT_SECONDS"
        )?,
        port: parse_env("PORT")?
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display
{
    match non_empty_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Source {
                source_name: "env".to_string(),
                reason: format!("{key}={raw}: {e}")
            }),
        None => Ok(None)
    }
}

fn parse_bool_env(key: &str) -> Result<Option<bool>, ConfigError> {
    match non_empty_env(key) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(ConfigError::Source {
                source_name: "env".to_string(),
                reason: format!("{key}={raw}: expected a boolean")
            })
        },
        None => Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "SERVER_NAME",
        "SERVER_PORT",
        "SERVER_STATIC_FILES_DIR",
        "SERVER_AUTH_RELOAD_SEC",
        "SERVER_DESTINATIONS_RELOAD_SEC",
        "SERVER_PUBLIC_URL",
        "SERVER_IDENTITY_FILE",
        "SERVER_AUTH",
        "SERVER_AUTH_FILE",
        "GEO_MAXMIND_PATH",
        "LOG_PATH",
        "LOG_SHOW_IN_SERVER",
        "LOG_ROTATION_MIN",
        "LOG_LEVEL",
        "METRICS_ENABLED",
        "SYNCHRONIZATION_SERVICE_CONNECTION_TIMEOUT_SECONDS",
        "PORT",
    ];

    fn clear_env() {
        for key in KEYS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_from_env_defaults() {
        clear_env();
        let config = load_from_env().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_load_from_env_overrides() {
        clear_env();
        unsafe {
            env::set_var("SERVER_NAME", "edge-1");
            env::set_var("SERVER_PORT", "9001");
            env::set_var("SERVER_AUTH", "123qwe, abc ,");
            env::set_var("LOG_SHOW_IN_SERVER", "true");
            env::set_var("PORT", "7000");
        }

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.server.name.as_deref(), Some("edge-1"));
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.auth, vec!["123qwe", "abc"]);
        assert!(config.log.show_in_server);
        assert_eq!(config.port, Some(7000));
        assert_eq!(config.authority(), "0.0.0.0:7000");
    }

    #[test]
    #[serial]
    fn test_blank_values_are_unset() {
        clear_env();
        unsafe {
            env::set_var("SERVER_NAME", "  ");
            env::set_var("PORT", "");
        }

        let config = load_from_env().unwrap();
        clear_env();

        assert!(config.server.name.is_none());
        assert!(config.port.is_none());
    }

    #[test]
    #[serial]
    fn test_invalid_number_is_an_error() {
        clear_env();
        unsafe {
            env::set_var("SERVER_PORT", "not_a_number");
        }

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(ConfigError::Source { .. })));
    }

    #[test]
    #[serial]
    fn test_invalid_bool_is_an_error() {
        clear_env();
        unsafe {
            env::set_var("METRICS_ENABLED", "maybe");
        }

        let result = load_from_env();
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_overrides_keep_default_valued_keys() {
        clear_env();
        unsafe {
            env::set_var("METRICS_ENABLED", "false");
            env::set_var("SERVER_PORT", "8001");
        }

        let overrides = load_overrides_from_env().unwrap();
        clear_env();

        assert_eq!(overrides.metrics_enabled, Some(false));
        assert_eq!(overrides.server_port, Some(8001));
        assert!(overrides.log_level.is_none());
    }

    #[test]
    #[serial]
    fn test_unset_environment_has_no_overrides() {
        clear_env();
        assert!(load_overrides_from_env().unwrap().is_empty());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a,b"), vec!["a", "b"]);
        assert!(split_list(" , ").is_empty());
    }
}
