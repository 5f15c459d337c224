//! Global logger setup.
//!
//! Log lines go to a rolling file under `log.path` and, when
//! `log.show_in_server` is set (or file output is disabled), to stdout.
//! `RUST_LOG` takes precedence over `log.level`.

use config::LogConfig;
use errors::{CloseError, RegistryError};
use ingest_core::Closeable;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Keeps the background log writer alive; closing it flushes buffered lines.
pub struct LogGuard {
    guard: Option<WorkerGuard>
}

impl Closeable for LogGuard {
    fn name(&self) -> &str {
        "log writer"
    }

    fn close(&mut self) -> Result<(), CloseError> {
        drop(self.guard.take());
        Ok(())
    }
}

/// Maps the configured period onto the closest rotation tracing-appender supports.
pub fn rotation_for(rotation_min: u64) -> Rotation {
    match rotation_min {
        0..60 => Rotation::MINUTELY,
        60..1440 => Rotation::HOURLY,
        _ => Rotation::DAILY
    }
}

/// Installs the global subscriber.
///
/// Returns the file writer guard when file output is enabled. If a global
/// subscriber is already installed (tests, embedding) the existing one is
/// kept and `None` is returned.
pub fn init_global_logger(
    config: &LogConfig,
    server_name: &str
) -> Result<Option<LogGuard>, RegistryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| RegistryError::Logging {
            reason: e.to_string()
        })?;

    let (file_layer, guard) = if config.path.trim().is_empty() {
        (None, None)
    } else {
        let appender = RollingFileAppender::builder()
            .rotation(rotation_for(config.rotation_min))
            .filename_prefix(format!("{server_name}-main"))
            .filename_suffix("log")
            .build(&config.path)
            .map_err(|e| RegistryError::Logging {
                reason: format!("{}: {e}", config.path)
            })?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard)
        )
    };

    let stdout_layer = (config.show_in_server || file_layer.is_none()).then(fmt::layer);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("Global logger already installed, keeping it");
        return Ok(None);
    }

    Ok(guard.map(|guard| LogGuard { guard: Some(guard) }))
}
