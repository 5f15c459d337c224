//! # Resolvers
//!
//! Concrete implementations of the enrichment capabilities:
//! - `geo`: MaxMind GeoLite2/GeoIP2 City database lookups
//! - `useragent`: woothee-based user-agent parsing

pub mod geo;
pub mod useragent;

pub use geo::{MaxMindGeoResolver, UnavailableGeoResolver, create_resolver};
pub use useragent::WootheeUaResolver;
