use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use portcall_core::error::{PortcallError, Result};
use portcall_core::Status;

/// Outcome of one endpoint call: status plus result data.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: Status,
    pub data: Map<String, Value>,
}

impl Reply {
    pub fn new(status: Status, data: Map<String, Value>) -> Self {
        Self { status, data }
    }

    /// `200 Ok` with `data`.
    pub fn ok(data: Map<String, Value>) -> Self {
        Self::new(Status::Ok, data)
    }

    /// Any status with an empty data object.
    pub fn status(status: Status) -> Self {
        Self::new(status, Map::new())
    }
}

/// A named operation callable through the request port.
///
/// Business outcomes (bad input, conflicts, stubs...) are returned as
/// `Ok(Reply)` with the matching status. `Err` and panics are reserved for
/// faults; the dispatcher turns both into `500 Server Error`.
#[async_trait]
pub trait Endpoint: Send + Sync {
    fn name(&self) -> &str;
    async fn handle(&self, data: Map<String, Value>) -> Result<Reply>;
}

/// Immutable endpoint table, assembled once before the dispatcher starts.
pub struct Registry {
    endpoints: HashMap<String, Arc<dyn Endpoint>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Endpoint>> {
        self.endpoints.get(name).cloned()
    }

    /// Like `get`, but a miss is an `UnknownEndpoint` error.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Endpoint>> {
        self.get(name)
            .ok_or_else(|| PortcallError::UnknownEndpoint(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.endpoints.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.endpoints.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("endpoints", &self.names()).finish()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    endpoints: Vec<Arc<dyn Endpoint>>,
}

impl RegistryBuilder {
    pub fn register(mut self, endpoint: Arc<dyn Endpoint>) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn register_all(mut self, endpoints: impl IntoIterator<Item = Arc<dyn Endpoint>>) -> Self {
        self.endpoints.extend(endpoints);
        self
    }

    /// Names registered so far, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.name().to_owned()).collect()
    }

    /// Freeze the table. Empty and duplicate names are rejected.
    pub fn build(self) -> Result<Registry> {
        let mut endpoints = HashMap::with_capacity(self.endpoints.len());
        for ep in self.endpoints {
            let name = ep.name().to_owned();
            if name.is_empty() {
                return Err(PortcallError::BadRequest("endpoint name must not be empty".into()));
            }
            if endpoints.insert(name.clone(), ep).is_some() {
                return Err(PortcallError::BadRequest(format!(
                    "endpoint registered twice: {name}"
                )));
            }
        }
        Ok(Registry { endpoints })
    }
}
