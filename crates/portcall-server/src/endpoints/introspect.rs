//! Endpoints that report on the server itself.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use portcall_core::error::Result;

use crate::dispatch::{Endpoint, Reply};
use crate::obs::DispatchMetrics;

/// `endpoints`: `{"endpoints": [names...]}`, sorted.
#[derive(Debug)]
pub struct ListEndpoints {
    names: Vec<String>,
}

impl ListEndpoints {
    pub const NAME: &'static str = "endpoints";

    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

#[async_trait]
impl Endpoint for ListEndpoints {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn handle(&self, _data: Map<String, Value>) -> Result<Reply> {
        let mut out = Map::new();
        out.insert("endpoints".into(), json!(self.names));
        Ok(Reply::ok(out))
    }
}

/// `metrics`: `{"text": <prometheus exposition>}`.
pub struct MetricsEndpoint {
    metrics: Arc<DispatchMetrics>,
}

impl MetricsEndpoint {
    pub fn new(metrics: Arc<DispatchMetrics>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Endpoint for MetricsEndpoint {
    fn name(&self) -> &str {
        "metrics"
    }

    async fn handle(&self, _data: Map<String, Value>) -> Result<Reply> {
        let mut out = Map::new();
        out.insert("text".into(), Value::String(self.metrics.render(&[])));
        Ok(Reply::ok(out))
    }
}
