//! Server identity bootstrap.
//!
//! The server name comes from configuration when set, otherwise from a small
//! JSON record on disk. A missing, empty or unparsable record is replaced by
//! the default one. Bootstrap never fails startup: write errors are reported
//! as issues and the default name is used.

use errors::IdentityError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_SERVER_NAME: &str = "unnamed-server";

/// Persisted `{ "server_name": ... }` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerIdentityRecord {
    pub server_name: String
}

impl Default for ServerIdentityRecord {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string()
        }
    }
}

/// Outcome of the bootstrap: the name plus any problems met along the way.
///
/// Bootstrap runs before the global logger exists (the logger is named after
/// the server), so problems are handed back for the caller to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub server_name: String,
    pub issues: Vec<String>
}

/// Resolves the server name, preferring a non-empty configured value.
pub fn resolve_server_name(configured: Option<&str>, identity_file: &Path) -> ResolvedIdentity {
    let mut issues = Vec::new();
    let server_name = match configured.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => read_server_name(identity_file, &mut issues)
    };
    ResolvedIdentity {
        server_name,
        issues
    }
}

fn read_server_name(path: &Path, issues: &mut Vec<String>) -> String {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return bootstrap(path, issues),
        Err(e) => {
            issues.push(format!("{} is unreadable: {e}", path.display()));
            return bootstrap(path, issues);
        }
    };

    match serde_json::from_slice::<ServerIdentityRecord>(&bytes) {
        Ok(record) if !record.server_name.trim().is_empty() => record.server_name,
        Ok(_) => {
            issues.push(format!("{} holds an empty server name", path.display()));
            bootstrap(path, issues)
        }
        Err(e) => {
            issues.push(format!("{} is not a valid identity record: {e}", path.display()));
            bootstrap(path, issues)
        }
    }
}

fn bootstrap(path: &Path, issues: &mut Vec<String>) -> String {
    let record = ServerIdentityRecord::default();
    if let Err(e) = write_record(path, &record) {
        issues.push(e.to_string());
    }
    record.server_name
}

/// Writes the record pretty-printed with two-space indentation.
pub fn write_record(path: &Path, record: &ServerIdentityRecord) -> Result<(), IdentityError> {
    let io_error = |e: std::io::Error| IdentityError::Io {
        path: path.display().to_string(),
        reason: e.to_string()
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let body = serde_json::to_string_pretty(record).map_err(|e| IdentityError::Serialization {
        reason: e.to_string()
    })?;

    std::fs::write(path, body).map_err(io_error)
}
