//! Capability traits for the ingestion pipeline

use crate::types::{Fact, GeoData, ParsedUa};
use errors::{CloseError, GeoError};

/// Maps an ip address to geolocation data.
///
/// Lookups are synchronous and bounded by the backend's own limits. A resolver
/// that could not be constructed reports `is_available() == false`; callers
/// skip enrichment instead of calling it.
pub trait GeoResolver: Send + Sync {
    fn resolve(&self, ip: &str) -> Result<GeoData, GeoError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Maps a user-agent string to parsed device/browser data.
///
/// There is no error channel: unknown agents produce a best-effort (possibly
/// empty) result.
pub trait UaResolver: Send + Sync {
    fn resolve(&self, user_agent: &str) -> ParsedUa;
}

/// A resource released once at shutdown.
pub trait Closeable: Send {
    fn name(&self) -> &str;

    fn close(&mut self) -> Result<(), CloseError>;
}

/// Downstream consumer of enriched facts.
pub trait FactSink: Send + Sync {
    fn consume(&self, fact: &Fact);
}
