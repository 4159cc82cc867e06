use serde::Deserialize;
use portcall_core::error::{PortcallError, Result};

/// Port numbers the host uses when nothing else is configured.
pub const DEFAULT_REQUEST_PORT: u32 = 1001;
pub const DEFAULT_RESPONSE_PORT: u32 = 1002;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PortcallError::UnsupportedVersion);
        }

        self.server.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_request_port")]
    pub request_port: u32,

    #[serde(default = "default_response_port")]
    pub response_port: u32,

    /// Messages a port holds before the oldest is evicted.
    #[serde(default = "default_port_capacity")]
    pub port_capacity: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            request_port: default_request_port(),
            response_port: default_response_port(),
            port_capacity: default_port_capacity(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.request_port == 0 || self.response_port == 0 {
            return Err(PortcallError::BadRequest(
                "server.request_port and server.response_port must be >= 1".into(),
            ));
        }
        if self.request_port == self.response_port {
            return Err(PortcallError::BadRequest(
                "server.request_port and server.response_port must differ".into(),
            ));
        }
        if !(1..=100_000).contains(&self.port_capacity) {
            return Err(PortcallError::BadRequest(
                "server.port_capacity must be between 1 and 100000".into(),
            ));
        }
        Ok(())
    }
}

fn default_request_port() -> u32 {
    DEFAULT_REQUEST_PORT
}
fn default_response_port() -> u32 {
    DEFAULT_RESPONSE_PORT
}
fn default_port_capacity() -> usize {
    50
}
