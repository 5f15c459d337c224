//! # Configuration Precedence
//!
//! Merges configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)

use crate::config::{
    Config, GeoConfig, LogConfig, MetricsConfig, ServerConfig, SynchronizationServiceConfig,
};
use crate::overrides::ConfigOverrides;
use std::fmt::Debug;

/// Merge multiple configuration sources with precedence.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Merges configuration from multiple sources following precedence rules:
/// CLI arguments > environment variables > config file > defaults.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, ConfigOverrides, load_from_file, load_overrides_from_env, merge_configs};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let from_file = load_from_file(Path::new("ingest.toml"))?;
///     let from_env = load_overrides_from_env()?;
///
///     let _config = merge_configs(
///         Config::default(),
///         Some(from_file),
///         "file",
///         from_env,
///         "env",
///         ConfigOverrides::default(),
///         "cli",
///     );
///     Ok(())
/// }
/// ```
///
/// ## Field Merge
/// - File: a full `Config`; a field wins when it differs from the default,
///   since serde fills absent keys with defaults.
/// - Environment and CLI: sparse `ConfigOverrides`; every key they set wins,
///   including default values.
pub fn merge_configs(
    defaults: Config,
    file_config: Option<Config>,
    file_source_name: &str,
    env_overrides: ConfigOverrides,
    env_source_name: &str,
    cli_overrides: ConfigOverrides,
    cli_source_name: &str
) -> Config {
    let mut config = defaults;

    if let Some(file) = file_config {
        config = merge_with_logging(config, &file, file_source_name);
    }
    apply_with_logging(&mut config, &env_overrides, env_source_name);
    apply_with_logging(&mut config, &cli_overrides, cli_source_name);

    config
}

fn apply_with_logging(config: &mut Config, overrides: &ConfigOverrides, source_name: &str) {
    let changes = overrides.apply_to(config);
    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }
}

fn merge_with_logging(mut base: Config, override_config: &Config, source_name: &str) -> Config {
    let defaults = Config::default();
    let mut changes = Vec::new();

    merge_server(
        &mut base.server,
        &override_config.server,
        &defaults.server,
        &mut changes
    );
    merge_geo(&mut base.geo, &override_config.geo, &defaults.geo, &mut changes);
    merge_log(&mut base.log, &override_config.log, &defaults.log, &mut changes);
    merge_metrics(
        &mut base.metrics,
        &override_config.metrics,
        &defaults.metrics,
        &mut changes
    );
    merge_synchronization(
        &mut base.synchronization_service,
        &override_config.synchronization_service,
        &defaults.synchronization_service,
        &mut changes
    );
    merge_field(
        &mut base.port,
        &override_config.port,
        &defaults.port,
        "port",
        &mut changes
    );

    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }

    base
}

fn merge_field<T>(base: &mut T, override_value: &T, default: &T, key: &str, changes: &mut Vec<String>)
where
    T: PartialEq + Clone + Debug
{
    if override_value != default && override_value != base {
        changes.push(format!("{key} = {override_value:?}"));
        base.clone_from(override_value);
    }
}

fn merge_server(
    base: &mut ServerConfig,
    override_config: &ServerConfig,
    defaults: &ServerConfig,
    changes: &mut Vec<String>
) {
    merge_field(&mut base.name, &override_config.name, &defaults.name, "server.name", changes);
    merge_field(&mut base.port, &override_config.port, &defaults.port, "server.port", changes);
    merge_field(
        &mut base.static_files_dir,
        &override_config.static_files_dir,
        &defaults.static_files_dir,
        "server.static_files_dir",
        changes
    );
    merge_field(
        &mut base.auth_reload_sec,
        &override_config.auth_reload_sec,
        &defaults.auth_reload_sec,
        "server.auth_reload_sec",
        changes
    );
    merge_field(
        &mut base.destinations_reload_sec,
        &override_config.destinations_reload_sec,
        &defaults.destinations_reload_sec,
        "server.destinations_reload_sec",
        changes
    );
    merge_field(
        &mut base.public_url,
        &override_config.public_url,
        &defaults.public_url,
        "server.public_url",
        changes
    );
    merge_field(
        &mut base.identity_file,
        &override_config.identity_file,
        &defaults.identity_file,
        "server.identity_file",
        changes
    );
    if !override_config.auth.is_empty() && override_config.auth != base.auth {
        changes.push("server.auth = ***".to_string());
        base.auth.clone_from(&override_config.auth);
    }
    merge_field(
        &mut base.auth_file,
        &override_config.auth_file,
        &defaults.auth_file,
        "server.auth_file",
        changes
    );
}

fn merge_geo(
    base: &mut GeoConfig,
    override_config: &GeoConfig,
    defaults: &GeoConfig,
    changes: &mut Vec<String>
) {
    merge_field(
        &mut base.maxmind_path,
        &override_config.maxmind_path,
        &defaults.maxmind_path,
        "geo.maxmind_path",
        changes
    );
}

fn merge_log(
    base: &mut LogConfig,
    override_config: &LogConfig,
    defaults: &LogConfig,
    changes: &mut Vec<String>
) {
    merge_field(&mut base.path, &override_config.path, &defaults.path, "log.path", changes);
    merge_field(
        &mut base.show_in_server,
        &override_config.show_in_server,
        &defaults.show_in_server,
        "log.show_in_server",
        changes
    );
    merge_field(
        &mut base.rotation_min,
        &override_config.rotation_min,
        &defaults.rotation_min,
        "log.rotation_min",
        changes
    );
    merge_field(&mut base.level, &override_config.level, &defaults.level, "log.level", changes);
}

fn merge_metrics(
    base: &mut MetricsConfig,
    override_config: &MetricsConfig,
    defaults: &MetricsConfig,
    changes: &mut Vec<String>
) {
    merge_field(
        &mut base.enabled,
        &override_config.enabled,
        &defaults.enabled,
        "metrics.enabled",
        changes
    );
}

fn merge_synchronization(
    base: &mut SynchronizationServiceConfig,
    override_config: &SynchronizationServiceConfig,
    defaults: &SynchronizationServiceConfig,
    changes: &mut Vec<String>
) {
    merge_field(
        &mut base.connection_timeout_seconds,
        &override_config.connection_timeout_seconds,
        &defaults.connection_timeout_seconds,
        "synchronization_service.connection_timeout_seconds",
        changes
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_port(port: u16) -> Config {
        let mut config = Config::default();
        config.server.port = port;
        config
    }

    fn merge(file: Option<Config>, env: ConfigOverrides, cli: ConfigOverrides) -> Config {
        merge_configs(Config::default(), file, "file", env, "env", cli, "cli")
    }

    #[test]
    fn test_env_overrides_file() {
        let env = ConfigOverrides {
            server_port: Some(9002),
            ..Default::default()
        };
        let merged = merge(Some(with_port(9001)), env, ConfigOverrides::default());
        assert_eq!(merged.server.port, 9002);
    }

    #[test]
    fn test_unset_sources_do_not_clobber() {
        let mut file = Config::default();
        file.server.name = Some("from-file".to_string());
        file.log.show_in_server = true;

        let merged = merge(Some(file), ConfigOverrides::default(), ConfigOverrides::default());

        assert_eq!(merged.server.name.as_deref(), Some("from-file"));
        assert!(merged.log.show_in_server);
    }

    #[test]
    fn test_env_default_values_override_file() {
        let mut file = with_port(9001);
        file.metrics.enabled = true;
        file.log.show_in_server = true;

        let env = ConfigOverrides {
            server_port: Some(8001),
            metrics_enabled: Some(false),
            log_show_in_server: Some(false),
            ..Default::default()
        };
        let merged = merge(Some(file), env, ConfigOverrides::default());

        assert_eq!(merged.server.port, 8001);
        assert!(!merged.metrics.enabled);
        assert!(!merged.log.show_in_server);
    }

    #[test]
    fn test_cli_wins_over_everything() {
        let env = ConfigOverrides {
            port: Some(6666),
            server_name: Some("env".to_string()),
            ..Default::default()
        };
        let cli = ConfigOverrides {
            port: Some(7777),
            server_name: Some("cli".to_string()),
            ..Default::default()
        };

        let merged = merge(None, env, cli);

        assert_eq!(merged.port, Some(7777));
        assert_eq!(merged.server.name.as_deref(), Some("cli"));
        assert_eq!(merged.authority(), "0.0.0.0:7777");
    }

    #[test]
    fn test_auth_tokens_replace_not_append() {
        let mut file = Config::default();
        file.server.auth = vec!["a".to_string(), "b".to_string()];
        let env = ConfigOverrides {
            auth: Some(vec!["c".to_string()]),
            ..Default::default()
        };

        let merged = merge(Some(file), env, ConfigOverrides::default());
        assert_eq!(merged.server.auth, vec!["c"]);
    }
}
