//! Prometheus metrics.

use crate::error::ServerError;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const FACTS_INGESTED_TOTAL: &str = "facts_ingested_total";
pub const FACTS_REJECTED_TOTAL: &str = "facts_rejected_total";

/// Installs the global Prometheus recorder when `enabled`.
///
/// The returned handle renders the exposition text served on `/metrics`.
pub fn init(enabled: bool) -> Result<Option<PrometheusHandle>, ServerError> {
    if !enabled {
        tracing::warn!("Metrics are not enabled");
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics {
            reason: e.to_string()
        })?;
    tracing::info!("Metrics enabled, exposed on /metrics");
    Ok(Some(handle))
}

pub fn record_ingested() {
    counter!(FACTS_INGESTED_TOTAL).increment(1);
}

pub fn record_rejected(reason: &'static str) {
    counter!(FACTS_REJECTED_TOTAL, "reason" => reason).increment(1);
}
