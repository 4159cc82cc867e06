use async_trait::async_trait;
use serde_json::{Map, Value};

use portcall_core::error::Result;

use crate::dispatch::{Endpoint, Reply};

/// Returns the request data unchanged. Useful to prove a client can reach
/// the server and read its reply.
#[derive(Debug, Default)]
pub struct Echo;

#[async_trait]
impl Endpoint for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    async fn handle(&self, data: Map<String, Value>) -> Result<Reply> {
        Ok(Reply::ok(data))
    }
}
