//! Server setup and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use crate::error::ServerError;
use crate::routes::create_router;
use crate::state::AppState;
use crate::telemetry;
use registry::AppConfig;

/// The ingestion HTTP server.
pub struct IngestServer {
    state: Arc<AppState>
}

impl IngestServer {
    /// Creates the server, installing the metrics recorder when enabled.
    pub fn new(app: Arc<AppConfig>) -> Result<Self, ServerError> {
        let metrics = telemetry::init(app.config.metrics.enabled)?;
        Ok(Self::with_state(Arc::new(AppState::new(app, metrics))))
    }

    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Serves until Ctrl+C or SIGTERM, then closes every registered resource.
    pub async fn run(self) -> Result<(), ServerError> {
        let authority = self.state.app.authority.clone();
        let addr: SocketAddr = authority.parse().map_err(|e: std::net::AddrParseError| {
            ServerError::Address {
                authority: authority.clone(),
                reason: e.to_string()
            }
        })?;

        let router = create_router(self.state.clone());

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                authority: authority.clone(),
                reason: e.to_string()
            })?;

        tracing::info!(%addr, "Started listen and serve");

        let served = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>()
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Serve {
            reason: e.to_string()
        });

        self.close();
        served
    }

    /// Releases the registry's resources; failures are logged, never fatal.
    pub fn close(&self) {
        let failures = self.state.app.close();
        if failures.is_empty() {
            tracing::info!("Server stopped");
        } else {
            tracing::warn!(failures = failures.len(), "Server stopped with close failures");
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

/// Signal handler for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
