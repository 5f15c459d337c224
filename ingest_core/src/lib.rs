//! # Ingest Core
//!
//! Shared types and traits for the fact ingestion service.
//!
//! This crate provides:
//! - The `Fact` representation and the well-known keys inside it
//! - Resolver result types (`GeoData`, `ParsedUa`)
//! - Capability traits implemented by resolvers, sinks and closeable resources

pub mod traits;
pub mod types;

pub use traits::{Closeable, FactSink, GeoResolver, UaResolver};
pub use types::{Fact, GeoData, ParsedUa};
