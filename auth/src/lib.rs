//! # Authorization
//!
//! API token authorization for fact submission.
//!
//! Tokens come from the static `server.auth` list plus an optional JSON token
//! file (`server.auth_file`, an array of strings). A token file is re-read
//! every `server.auth_reload_sec` seconds by a [`TokenReloader`] task on the
//! tokio runtime, which the application registry closes at shutdown.

use config::ServerConfig;
use errors::{AuthError, CloseError};
use ingest_core::Closeable;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

type TokenSet = Arc<RwLock<HashSet<String>>>;

pub struct AuthorizationService {
    tokens: TokenSet,
    static_tokens: HashSet<String>,
    source: Option<PathBuf>,
    reload_period: Duration
}

impl AuthorizationService {
    /// Builds the service from the server section of the configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, AuthError> {
        Self::new(
            &config.auth,
            config.auth_file.as_deref(),
            Duration::from_secs(config.auth_reload_sec)
        )
    }

    /// Creates the service.
    ///
    /// An unreadable or malformed token file is an error. With no tokens at
    /// all a random token is generated and logged so the endpoint is never
    /// left open.
    pub fn new(
        static_tokens: &[String],
        tokens_file: Option<&Path>,
        reload_period: Duration
    ) -> Result<Self, AuthError> {
        let static_tokens: HashSet<String> = static_tokens
            .iter()
            .filter(|t| !t.is_empty())
            .cloned()
            .collect();

        let mut tokens = static_tokens.clone();
        if let Some(path) = tokens_file {
            tokens.extend(load_tokens_file(path)?);
        }

        if tokens.is_empty() {
            let generated = uuid::Uuid::new_v4().simple().to_string();
            tracing::warn!(
                token = %generated,
                "No API tokens configured, generated a random one"
            );
            tokens.insert(generated);
        } else {
            tracing::info!(count = tokens.len(), "Loaded API tokens");
        }

        Ok(Self {
            tokens: Arc::new(RwLock::new(tokens)),
            static_tokens,
            source: tokens_file.map(Path::to_path_buf),
            reload_period
        })
    }

    pub fn authorize(&self, token: &str) -> bool {
        !token.is_empty() && self.tokens.read().contains(token)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.read().len()
    }

    /// Starts periodic reloading of the token file on the current tokio runtime.
    ///
    /// Returns `None` when tokens are static only.
    pub fn start_reloading(&self) -> Result<Option<TokenReloader>, AuthError> {
        let Some(path) = self.source.clone() else {
            return Ok(None);
        };
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            AuthError::ReloaderSpawn {
                reason: e.to_string()
            }
        })?;

        Ok(Some(TokenReloader::spawn(
            &runtime,
            path,
            self.static_tokens.clone(),
            self.tokens.clone(),
            self.reload_period
        )))
    }
}

/// Reads a JSON array of tokens.
pub fn load_tokens_file(path: &Path) -> Result<HashSet<String>, AuthError> {
    let raw = std::fs::read(path).map_err(|e| unreadable(path, &e))?;
    parse_tokens(path, &raw)
}

async fn read_tokens_file(path: &Path) -> Result<HashSet<String>, AuthError> {
    let raw = tokio::fs::read(path).await.map_err(|e| unreadable(path, &e))?;
    parse_tokens(path, &raw)
}

fn unreadable(path: &Path, e: &std::io::Error) -> AuthError {
    AuthError::SourceUnreadable {
        path: path.display().to_string(),
        reason: e.to_string()
    }
}

fn parse_tokens(path: &Path, raw: &[u8]) -> Result<HashSet<String>, AuthError> {
    let tokens: Vec<String> =
        serde_json::from_slice(raw).map_err(|e| AuthError::SourceMalformed {
            path: path.display().to_string(),
            reason: e.to_string()
        })?;

    Ok(tokens.into_iter().filter(|t| !t.is_empty()).collect())
}

/// Background task re-reading the token file every reload period.
///
/// Each reload installs the static tokens plus the file's tokens. A failed
/// reload keeps the previous set.
pub struct TokenReloader {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>
}

impl TokenReloader {
    fn spawn(
        runtime: &tokio::runtime::Handle,
        path: PathBuf,
        static_tokens: HashSet<String>,
        tokens: TokenSet,
        period: Duration
    ) -> Self {
        let (stop, mut stop_rx) = watch::channel(false);

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => reload(&path, &static_tokens, &tokens).await,
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Token reloader stopped");
        });

        Self {
            stop,
            task: Some(task)
        }
    }
}

async fn reload(path: &Path, static_tokens: &HashSet<String>, tokens: &TokenSet) {
    match read_tokens_file(path).await {
        Ok(fresh) if fresh.is_empty() => {
            tracing::warn!(path = %path.display(), "Token file is empty, keeping previous tokens");
        }
        Ok(fresh) => {
            let mut merged = static_tokens.clone();
            merged.extend(fresh);
            let count = merged.len();
            *tokens.write() = merged;
            tracing::debug!(count, "Reloaded API tokens");
        }
        Err(e) => tracing::error!(error = %e, "Token reload failed, keeping previous tokens")
    }
}

impl Closeable for TokenReloader {
    fn name(&self) -> &str {
        "auth token reloader"
    }

    fn close(&mut self) -> Result<(), CloseError> {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }
}
