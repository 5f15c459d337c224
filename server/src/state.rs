//! Shared application state for the HTTP handlers.

use events::{ApiPreprocessor, Preprocessor, TracingFactSink};
use ingest_core::FactSink;
use metrics_exporter_prometheus::PrometheusHandle;
use registry::AppConfig;
use std::sync::Arc;

pub struct AppState {
    pub app: Arc<AppConfig>,
    pub preprocessor: Arc<dyn Preprocessor>,
    pub sink: Arc<dyn FactSink>,
    /// Present when metrics are enabled.
    pub metrics: Option<PrometheusHandle>
}

impl AppState {
    /// State with the API preprocessor and the tracing fact sink.
    pub fn new(app: Arc<AppConfig>, metrics: Option<PrometheusHandle>) -> Self {
        let preprocessor = Arc::new(ApiPreprocessor::new(&app));
        Self::with_parts(app, preprocessor, Arc::new(TracingFactSink), metrics)
    }

    pub fn with_parts(
        app: Arc<AppConfig>,
        preprocessor: Arc<dyn Preprocessor>,
        sink: Arc<dyn FactSink>,
        metrics: Option<PrometheusHandle>
    ) -> Self {
        Self {
            app,
            preprocessor,
            sink,
            metrics
        }
    }
}
