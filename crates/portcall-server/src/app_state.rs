//! Shared application state for the portcall server.
//!
//! Owns the config, the port table, metrics, and the frozen endpoint
//! registry. Startup errors are returned, not panicked on.

use std::sync::Arc;

use portcall_core::error::Result;

use crate::config::ServerConfig;
use crate::dispatch::{Dispatcher, Endpoint, Registry};
use crate::endpoints;
use crate::obs::DispatchMetrics;
use crate::transport::{Port, PortHub};

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<ServerConfig>,
    hub: Arc<PortHub>,
    registry: Arc<Registry>,
    metrics: Arc<DispatchMetrics>,
}

impl AppState {
    /// Server with only the built-in endpoints.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        Self::with_endpoints(cfg, Vec::new())
    }

    /// Server with the built-ins plus `extra`. The registry is frozen here.
    pub fn with_endpoints(cfg: ServerConfig, extra: Vec<Arc<dyn Endpoint>>) -> Result<Self> {
        let hub = PortHub::new(cfg.server.port_capacity);
        Self::with_hub(cfg, Arc::new(hub), extra)
    }

    /// Like `with_endpoints`, sharing an existing port table.
    pub fn with_hub(
        cfg: ServerConfig,
        hub: Arc<PortHub>,
        extra: Vec<Arc<dyn Endpoint>>,
    ) -> Result<Self> {
        cfg.validate()?;
        let metrics = Arc::new(DispatchMetrics::default());
        let registry = endpoints::registry(Arc::clone(&metrics), extra)?;

        for name in registry.names() {
            tracing::info!(endpoint = %name, "endpoint recognized");
        }

        Ok(Self {
            cfg: Arc::new(cfg),
            hub,
            registry: Arc::new(registry),
            metrics,
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.cfg
    }

    pub fn hub(&self) -> Arc<PortHub> {
        Arc::clone(&self.hub)
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn request_port(&self) -> Arc<Port> {
        self.hub.handle(self.cfg.server.request_port)
    }

    pub fn response_port(&self) -> Arc<Port> {
        self.hub.handle(self.cfg.server.response_port)
    }

    /// A dispatcher bound to the configured ports.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.registry(),
            self.request_port(),
            self.response_port(),
            self.metrics(),
        )
    }
}
