//! Route definitions.

use axum::{
    Router,
    routing::{get, post}
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer
};

use crate::handlers;
use crate::state::AppState;

/// Creates the router with every endpoint and the static file service.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Events are posted from arbitrary origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.app.config.server.static_files_dir);

    let api_v1 = Router::new().route("/event", post(handlers::ingest_event));

    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_v1)
        .nest_service("/s", static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
