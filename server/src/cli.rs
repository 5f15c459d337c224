//! Command line interface and configuration assembly.

use clap::Parser;
use config::{Config, ConfigOverrides, load_from_file, load_overrides_from_env, merge_configs};
use errors::ConfigError;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(name = "ingest-server")]
#[command(about = "Collects analytics facts over HTTP and enriches them with geo and device data")]
#[command(version)]
pub struct Cli {
    /// Configuration file (.toml, .yaml or .yml)
    #[arg(short, long, env = "INGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen port, overrides every other source
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Server name, overrides the persisted identity
    #[arg(long)]
    pub server_name: Option<String>
}

impl Cli {
    /// Keys set by command line flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            server_name: self.server_name.clone(),
            ..ConfigOverrides::default()
        }
    }

    /// Merges defaults, the config file, the environment and the flags.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let from_file = self.config.as_deref().map(load_from_file).transpose()?;
        let from_env = load_overrides_from_env()?;

        Ok(merge_configs(
            Config::default(),
            from_file,
            "file",
            from_env,
            "env",
            self.overrides(),
            "cli"
        ))
    }
}
