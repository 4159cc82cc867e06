use async_trait::async_trait;
use serde_json::{Map, Value};

use portcall_core::error::Result;
use portcall_core::Status;

use crate::dispatch::{Endpoint, Reply};

/// Placeholder for an endpoint whose name is reserved but whose logic does
/// not exist yet. Always answers `501 Not Implemented`.
#[derive(Debug)]
pub struct Stubbed {
    name: String,
}

impl Stubbed {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Endpoint for Stubbed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _data: Map<String, Value>) -> Result<Reply> {
        Ok(Reply::status(Status::NotImplemented))
    }
}
