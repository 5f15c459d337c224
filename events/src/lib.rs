//! # Events
//!
//! Preprocessing of submitted facts before they reach a sink.
//!
//! - `preprocessor`: the `Preprocessor` seam and the server-to-server
//!   `ApiPreprocessor` (source tagging, client ip, geo and user-agent
//!   enrichment)
//! - `request`: client ip extraction from request metadata
//! - `sink`: fact sinks

pub mod preprocessor;
pub mod request;
pub mod sink;

pub use preprocessor::{ApiPreprocessor, Preprocessor};
pub use request::{RequestMeta, extract_ip};
pub use sink::TracingFactSink;
