use errors::{CloseError, GeoError};
use ingest_core::{Closeable, Fact, FactSink, GeoData, GeoResolver, ParsedUa, UaResolver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers every lookup with the same data and remembers the ips asked for.
#[derive(Default)]
pub struct StaticGeoResolver {
    data: GeoData,
    lookups: Mutex<Vec<String>>
}

impl StaticGeoResolver {
    pub fn new(data: GeoData) -> Self {
        Self {
            data,
            lookups: Mutex::new(Vec::new())
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }
}

impl GeoResolver for StaticGeoResolver {
    fn resolve(&self, ip: &str) -> Result<GeoData, GeoError> {
        self.lookups.lock().push(ip.to_string());
        Ok(self.data.clone())
    }
}

/// Fails every lookup with `LookupFailed`.
#[derive(Default)]
pub struct FailingGeoResolver {
    calls: AtomicUsize
}

impl FailingGeoResolver {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeoResolver for FailingGeoResolver {
    fn resolve(&self, ip: &str) -> Result<GeoData, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GeoError::LookupFailed {
            ip: ip.to_string(),
            reason: "lookup failed in test".to_string()
        })
    }
}

/// Resolver whose database never loaded; counts calls that should not happen.
#[derive(Default)]
pub struct OfflineGeoResolver {
    calls: AtomicUsize
}

impl OfflineGeoResolver {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeoResolver for OfflineGeoResolver {
    fn resolve(&self, _ip: &str) -> Result<GeoData, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GeoError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Returns a fixed parse result and counts calls.
#[derive(Default)]
pub struct CountingUaResolver {
    parsed: ParsedUa,
    calls: AtomicUsize
}

impl CountingUaResolver {
    pub fn new(parsed: ParsedUa) -> Self {
        Self {
            parsed,
            calls: AtomicUsize::new(0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UaResolver for CountingUaResolver {
    fn resolve(&self, _user_agent: &str) -> ParsedUa {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.parsed.clone()
    }
}

/// Shared, ordered record of close calls across several resources.
pub type CloseLog = Arc<Mutex<Vec<String>>>;

/// Closeable that appends its name to a [`CloseLog`] on every close.
pub struct RecordingCloseable {
    name: String,
    log: CloseLog,
    fail: bool
}

impl RecordingCloseable {
    pub fn new(name: &str, log: &CloseLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            fail: false
        }
    }

    /// Same as [`RecordingCloseable::new`] but `close` reports a failure.
    pub fn failing(name: &str, log: &CloseLog) -> Self {
        Self {
            fail: true,
            ..Self::new(name, log)
        }
    }
}

impl Closeable for RecordingCloseable {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> Result<(), CloseError> {
        self.log.lock().push(self.name.clone());
        if self.fail {
            return Err(CloseError::Failed {
                resource: self.name.clone(),
                reason: "close failed in test".to_string()
            });
        }
        Ok(())
    }
}

/// Keeps every consumed fact.
#[derive(Default)]
pub struct MemoryFactSink {
    facts: Mutex<Vec<Fact>>
}

impl MemoryFactSink {
    pub fn facts(&self) -> Vec<Fact> {
        self.facts.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.facts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.lock().is_empty()
    }
}

impl FactSink for MemoryFactSink {
    fn consume(&self, fact: &Fact) {
        self.facts.lock().push(fact.clone());
    }
}
