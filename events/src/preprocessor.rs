//! Fact preprocessing.

use crate::request::{RequestMeta, extract_ip};
use errors::PreprocessError;
use ingest_core::types::{
    API_SRC, DEVICE_CTX_KEY, DEVICE_IP_KEY, GEO_DATA_KEY, PARSED_UA_KEY, SOURCE_IP_KEY, SRC_KEY,
    UA_KEY
};
use ingest_core::{Fact, GeoData, GeoResolver, UaResolver};
use registry::AppConfig;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Prepares a submitted fact before it is handed to a sink.
pub trait Preprocessor: Send + Sync {
    /// Mutates `fact` in place and returns it.
    ///
    /// `None` stands for an absent fact (JSON `null` or a non-object body)
    /// and is rejected without side effects.
    fn preprocess<'a>(
        &self,
        fact: Option<&'a mut Fact>,
        request: &RequestMeta
    ) -> Result<&'a mut Fact, PreprocessError>;
}

/// Preprocessor for server-to-server submissions.
///
/// Marks the fact as `src = "api"`, records the client ip and fills
/// `device_ctx.geo` and `device_ctx.parsed_ua` unless the submitter already
/// provided them.
pub struct ApiPreprocessor {
    geo_resolver: Arc<dyn GeoResolver>,
    ua_resolver: Arc<dyn UaResolver>
}

impl ApiPreprocessor {
    pub fn new(app: &AppConfig) -> Self {
        Self::with_resolvers(app.geo_resolver.clone(), app.ua_resolver.clone())
    }

    pub fn with_resolvers(
        geo_resolver: Arc<dyn GeoResolver>,
        ua_resolver: Arc<dyn UaResolver>
    ) -> Self {
        Self {
            geo_resolver,
            ua_resolver
        }
    }

    fn enrich_geo(&self, device_ctx: &mut Map<String, Value>) {
        if device_ctx.contains_key(GEO_DATA_KEY) {
            return;
        }
        let Some(ip) = device_ctx.get(DEVICE_IP_KEY).and_then(Value::as_str) else {
            return;
        };
        if !self.geo_resolver.is_available() {
            tracing::debug!(ip, "Geo resolver unavailable, skipping geo enrichment");
            return;
        }

        let geo = match self.geo_resolver.resolve(ip) {
            Ok(geo) => geo,
            Err(e) => {
                tracing::error!(error = %e, "Geo resolution failed");
                GeoData::default()
            }
        };
        device_ctx.insert(GEO_DATA_KEY.to_string(), geo.to_value());
    }

    fn enrich_user_agent(&self, device_ctx: &mut Map<String, Value>) {
        if device_ctx.contains_key(PARSED_UA_KEY) {
            return;
        }
        let Some(ua) = device_ctx.get(UA_KEY).and_then(Value::as_str) else {
            return;
        };

        let parsed = self.ua_resolver.resolve(ua);
        device_ctx.insert(PARSED_UA_KEY.to_string(), parsed.to_value());
    }
}

impl Preprocessor for ApiPreprocessor {
    fn preprocess<'a>(
        &self,
        fact: Option<&'a mut Fact>,
        request: &RequestMeta
    ) -> Result<&'a mut Fact, PreprocessError> {
        let fact = fact.ok_or_else(PreprocessError::nil_fact)?;

        fact.insert(SRC_KEY.to_string(), Value::from(API_SRC));

        let ip = extract_ip(request);
        if !ip.is_empty() {
            fact.insert(SOURCE_IP_KEY.to_string(), Value::String(ip));
        }

        if let Some(Value::Object(device_ctx)) = fact.get_mut(DEVICE_CTX_KEY) {
            self.enrich_geo(device_ctx);
            self.enrich_user_agent(device_ctx);
        }

        Ok(fact)
    }
}
