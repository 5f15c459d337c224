//! # Ingest Server
//!
//! HTTP front end of the fact ingestion service.
//!
//! ## Endpoints
//!
//! - `POST /api/v1/event?token=<t>` - Submit one fact (token may also be sent as `X-Auth-Token`)
//! - `GET /ping` - Liveness check
//! - `GET /health` - Health check with server name
//! - `GET /metrics` - Prometheus metrics, when enabled
//! - `GET /s/*` - Static files from `server.static_files_dir`

pub mod cli;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use cli::Cli;
pub use error::{ApiError, ServerError};
pub use routes::create_router;
pub use server::IngestServer;
pub use state::AppState;
