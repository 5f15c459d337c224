//! Application registry: resolved configuration, shared resolvers and the
//! ordered list of resources released at shutdown.
//!
//! `AppConfig` is built once, before traffic, and then shared as
//! `Arc<AppConfig>`. Its fields never change after `init` returns; only the
//! closeable list grows, behind a mutex.

use crate::identity;
use crate::logging;
use auth::AuthorizationService;
use config::Config;
use errors::{CloseError, RegistryError};
use ingest_core::{Closeable, GeoResolver, UaResolver};
use parking_lot::Mutex;
use resolvers::{UnavailableGeoResolver, WootheeUaResolver};
use std::sync::Arc;

pub struct AppConfig {
    pub server_name: String,
    /// Listen address, `host:port`.
    pub authority: String,
    pub public_url: Option<String>,
    pub geo_resolver: Arc<dyn GeoResolver>,
    pub ua_resolver: Arc<dyn UaResolver>,
    pub authorization: Arc<AuthorizationService>,
    pub config: Config,
    close_me: Mutex<Vec<Box<dyn Closeable>>>
}

impl AppConfig {
    /// Builds the registry from fully merged configuration.
    ///
    /// Authorization failures are fatal. A geo database that cannot be
    /// opened only disables geo enrichment. With `server.auth_file` set this
    /// must run inside a tokio runtime, which hosts the token reloader.
    pub fn init(config: Config) -> Result<Self, RegistryError> {
        config::validate(&config)?;

        let identity =
            identity::resolve_server_name(config.server.name.as_deref(), &config.server.identity_file);
        let log_guard = logging::init_global_logger(&config.log, &identity.server_name)?;

        tracing::info!("*** Creating new AppConfig ***");
        tracing::info!(server_name = %identity.server_name, "Server name resolved");
        for issue in &identity.issues {
            tracing::warn!("Server identity: {issue}");
        }
        match config.server.public_url.as_deref() {
            Some(url) => tracing::info!(public_url = %url, "Server public url"),
            None => tracing::warn!("Server public url: will be taken from Host header")
        }

        let geo_resolver: Arc<dyn GeoResolver> =
            match resolvers::create_resolver(&config.geo.maxmind_path) {
                Ok(resolver) => Arc::new(resolver),
                Err(e) => {
                    tracing::warn!(error = %e, "Run without geo resolver");
                    Arc::new(UnavailableGeoResolver)
                }
            };

        let authorization = Arc::new(AuthorizationService::from_config(&config.server)?);
        let reloader = authorization.start_reloading()?;

        let app = Self::new(
            config,
            identity.server_name,
            geo_resolver,
            Arc::new(WootheeUaResolver::new()),
            authorization
        );

        if let Some(reloader) = reloader {
            app.schedule_closing(Box::new(reloader));
        }
        // Last, so shutdown messages from earlier resources still reach the file.
        if let Some(guard) = log_guard {
            app.schedule_closing(Box::new(guard));
        }

        tracing::info!(authority = %app.authority, "AppConfig initialized");
        Ok(app)
    }

    /// Assembles a registry from already constructed parts.
    pub fn new(
        config: Config,
        server_name: String,
        geo_resolver: Arc<dyn GeoResolver>,
        ua_resolver: Arc<dyn UaResolver>,
        authorization: Arc<AuthorizationService>
    ) -> Self {
        Self {
            server_name,
            authority: config.authority(),
            public_url: config.server.public_url.clone(),
            geo_resolver,
            ua_resolver,
            authorization,
            config,
            close_me: Mutex::new(Vec::new())
        }
    }

    /// Registers a resource to be closed at shutdown, after those registered before it.
    pub fn schedule_closing(&self, resource: Box<dyn Closeable>) {
        tracing::debug!(resource = resource.name(), "Scheduled for closing");
        self.close_me.lock().push(resource);
    }

    pub fn scheduled_count(&self) -> usize {
        self.close_me.lock().len()
    }

    /// Closes every registered resource in registration order.
    ///
    /// A failing resource is logged and does not stop the rest. All failures
    /// are returned. Resources are closed once: a second call finds the list
    /// empty.
    pub fn close(&self) -> Vec<CloseError> {
        let resources = std::mem::take(&mut *self.close_me.lock());
        let mut failures = Vec::new();

        for mut resource in resources {
            match resource.close() {
                Ok(()) => tracing::debug!(resource = resource.name(), "Closed"),
                Err(e) => {
                    tracing::error!(error = %e, resource = resource.name(), "Close failed");
                    failures.push(e);
                }
            }
        }

        failures
    }
}
