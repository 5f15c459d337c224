//! # Configuration Overrides
//!
//! Sparse configuration contributed by the environment and the command line.
//!
//! Every field is optional: `Some` means the source set the key, even when
//! the value equals the built-in default, so `METRICS_ENABLED=false` still
//! turns off metrics enabled by a config file.

use crate::config::Config;
use std::fmt::Debug;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub server_name: Option<String>,
    pub server_port: Option<u16>,
    pub static_files_dir: Option<PathBuf>,
    pub auth_reload_sec: Option<u64>,
    pub destinations_reload_sec: Option<u64>,
    pub public_url: Option<String>,
    pub identity_file: Option<PathBuf>,
    pub auth: Option<Vec<String>>,
    pub auth_file: Option<PathBuf>,
    pub maxmind_path: Option<String>,
    pub log_path: Option<String>,
    pub log_show_in_server: Option<bool>,
    pub log_rotation_min: Option<u64>,
    pub log_level: Option<String>,
    pub metrics_enabled: Option<bool>,
    pub connection_timeout_seconds: Option<u64>,
    pub port: Option<u16>
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes every set key into `config`; returns the keys that changed.
    ///
    /// Token values are masked in the returned descriptions.
    pub fn apply_to(&self, config: &mut Config) -> Vec<String> {
        let mut changes = Vec::new();
        let server = &mut config.server;

        set_optional(&mut server.name, self.server_name.as_ref(), "server.name", &mut changes);
        set(&mut server.port, self.server_port.as_ref(), "server.port", &mut changes);
        set(
            &mut server.static_files_dir,
            self.static_files_dir.as_ref(),
            "server.static_files_dir",
            &mut changes
        );
        set(
            &mut server.auth_reload_sec,
            self.auth_reload_sec.as_ref(),
            "server.auth_reload_sec",
            &mut changes
        );
        set(
            &mut server.destinations_reload_sec,
            self.destinations_reload_sec.as_ref(),
            "server.destinations_reload_sec",
            &mut changes
        );
        set_optional(
            &mut server.public_url,
            self.public_url.as_ref(),
            "server.public_url",
            &mut changes
        );
        set(
            &mut server.identity_file,
            self.identity_file.as_ref(),
            "server.identity_file",
            &mut changes
        );
        if let Some(auth) = &self.auth {
            if *auth != server.auth {
                changes.push("server.auth = ***".to_string());
                server.auth.clone_from(auth);
            }
        }
        set_optional(
            &mut server.auth_file,
            self.auth_file.as_ref(),
            "server.auth_file",
            &mut changes
        );

        set(
            &mut config.geo.maxmind_path,
            self.maxmind_path.as_ref(),
            "geo.maxmind_path",
            &mut changes
        );

        let log = &mut config.log;
        set(&mut log.path, self.log_path.as_ref(), "log.path", &mut changes);
        set(
            &mut log.show_in_server,
            self.log_show_in_server.as_ref(),
            "log.show_in_server",
            &mut changes
        );
        set(
            &mut log.rotation_min,
            self.log_rotation_min.as_ref(),
            "log.rotation_min",
            &mut changes
        );
        set(&mut log.level, self.log_level.as_ref(), "log.level", &mut changes);

        set(
            &mut config.metrics.enabled,
            self.metrics_enabled.as_ref(),
            "metrics.enabled",
            &mut changes
        );
        set(
            &mut config.synchronization_service.connection_timeout_seconds,
            self.connection_timeout_seconds.as_ref(),
            "synchronization_service.connection_timeout_seconds",
            &mut changes
        );
        set_optional(&mut config.port, self.port.as_ref(), "port", &mut changes);

        changes
    }

    /// Plain `Config` view: defaults with these overrides applied.
    pub fn to_config(&self) -> Config {
        let mut config = Config::default();
        self.apply_to(&mut config);
        config
    }
}

fn set<T>(target: &mut T, value: Option<&T>, key: &str, changes: &mut Vec<String>)
where
    T: PartialEq + Clone + Debug
{
    if let Some(value) = value {
        if value != target {
            changes.push(format!("{key} = {value:?}"));
            target.clone_from(value);
        }
    }
}

fn set_optional<T>(target: &mut Option<T>, value: Option<&T>, key: &str, changes: &mut Vec<String>)
where
    T: PartialEq + Clone + Debug
{
    if let Some(value) = value {
        if target.as_ref() != Some(value) {
            changes.push(format!("{key} = {value:?}"));
            *target = Some(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut config = Config::default();
        config.metrics.enabled = true;
        let before = config.clone();

        let changes = ConfigOverrides::default().apply_to(&mut config);

        assert!(changes.is_empty());
        assert_eq!(config, before);
    }

    #[test]
    fn test_default_valued_override_still_wins() {
        let mut config = Config::default();
        config.metrics.enabled = true;
        config.log.show_in_server = true;
        config.server.port = 9000;

        let overrides = ConfigOverrides {
            metrics_enabled: Some(false),
            log_show_in_server: Some(false),
            server_port: Some(8001),
            ..Default::default()
        };
        let changes = overrides.apply_to(&mut config);

        assert!(!config.metrics.enabled);
        assert!(!config.log.show_in_server);
        assert_eq!(config.server.port, 8001);
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn test_tokens_are_masked() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            auth: Some(vec!["secret".to_string()]),
            ..Default::default()
        };

        let changes = overrides.apply_to(&mut config);

        assert_eq!(changes, vec!["server.auth = ***"]);
        assert_eq!(config.server.auth, vec!["secret"]);
    }
}
