//! HTTP request handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse
};
use events::RequestMeta;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;
use crate::telemetry;

/// Header carrying the API token when it is not passed as `?token=`.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// Largest accepted event body.
pub const MAX_EVENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub server_name: String,
    pub timestamp: String
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>
}

/// GET /ping
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            server_name: state.app.server_name.clone(),
            timestamp: chrono::Utc::now().to_rfc3339()
        })
    )
}

/// GET /metrics
///
/// Prometheus exposition text, or 404 when metrics are disabled.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(ApiError::MetricsDisabled)
}

/// POST /api/v1/event
///
/// Accepts one fact from a server-side integration, preprocesses it and
/// hands it to the fact sink.
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    request: Request
) -> Result<Json<StatusResponse>, ApiError> {
    let result = accept_event(&state, request).await;
    match &result {
        Ok(_) => telemetry::record_ingested(),
        Err(e) => {
            tracing::debug!(error = %e, "Event rejected");
            telemetry::record_rejected(e.reason());
        }
    }
    result
}

async fn accept_event(state: &AppState, request: Request) -> Result<Json<StatusResponse>, ApiError> {
    let token = request_token(&request);
    if !state.app.authorization.authorize(&token) {
        return Err(ApiError::Unauthorized);
    }

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let meta = request_meta(request.headers(), remote_addr);

    let body: Bytes = axum::body::to_bytes(request.into_body(), MAX_EVENT_BYTES)
        .await
        .map_err(|e| ApiError::UnreadableBody {
            reason: e.to_string()
        })?;

    let mut payload: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidJson {
            reason: e.to_string()
        })?;

    let fact = state.preprocessor.preprocess(payload.as_object_mut(), &meta)?;
    state.sink.consume(fact);

    Ok(Json(StatusResponse {
        status: "ok".to_string()
    }))
}

fn request_token(request: &Request) -> String {
    let from_query = Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty());

    from_query
        .or_else(|| {
            request
                .headers()
                .get(TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

fn request_meta(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> RequestMeta {
    RequestMeta::from_lookup(
        |name| headers.get(name).and_then(|value| value.to_str().ok()),
        remote_addr
    )
}
