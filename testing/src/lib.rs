//! Shared test doubles for the ingestion workspace.
//!
//! Provides in-memory stand-ins for the capability traits:
//! - Geo resolvers with a fixed answer, a fixed failure, or no database
//! - A user-agent resolver that counts calls
//! - A closeable resource that records when it is closed
//! - A fact sink that keeps everything it receives

mod doubles;

pub use doubles::*;
