//! Fact sinks.

use ingest_core::{Fact, FactSink};

/// Tracing target every fact line is written on.
pub const FACTS_TARGET: &str = "facts";

/// Writes each fact as one JSON line on the `facts` tracing target.
///
/// Route the target to its own file or collector with `RUST_LOG`
/// (for example `RUST_LOG=info,facts=info`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFactSink;

impl FactSink for TracingFactSink {
    fn consume(&self, fact: &Fact) {
        match serde_json::to_string(fact) {
            Ok(line) => tracing::info!(target: FACTS_TARGET, "{line}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize fact")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_consume_does_not_panic_without_subscriber() {
        let fact = json!({"event": "click"}).as_object().cloned().unwrap();
        TracingFactSink.consume(&fact);
    }
}
