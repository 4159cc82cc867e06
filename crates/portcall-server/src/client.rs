//! Client side of the port protocol.
//!
//! The response port is shared by every caller, so a client never blindly
//! reads it: it waits for a change, looks at the head message, and takes it
//! only when `to` and `callback` both match its own request.

use std::sync::Arc;
use std::time::Duration;

use portcall_core::error::{PortcallError, Result};
use portcall_core::protocol::{decode_response, encode_request, Request, Response};

use crate::config::ServerSection;
use crate::transport::{Port, PortHub};

#[derive(Clone)]
pub struct Client {
    requests: Arc<Port>,
    responses: Arc<Port>,
}

impl Client {
    pub fn new(hub: &PortHub, request_port: u32, response_port: u32) -> Self {
        Self {
            requests: hub.handle(request_port),
            responses: hub.handle(response_port),
        }
    }

    pub fn from_config(hub: &PortHub, cfg: &ServerSection) -> Self {
        Self::new(hub, cfg.request_port, cfg.response_port)
    }

    /// Write `req` to the request port without waiting for anything.
    pub fn send(&self, req: &Request) -> Result<()> {
        let text = encode_request(req)?;
        if let Some(evicted) = self.requests.write(text) {
            tracing::warn!(port = self.requests.id(), evicted = %evicted, "request port full; oldest request evicted");
        }
        Ok(())
    }

    /// Send `req` and wait for the matching response.
    ///
    /// Rejects requests that can never be answered (no origin, or `noreply`).
    pub async fn call(&self, req: &Request) -> Result<Response> {
        if !req.wants_reply() {
            return Err(PortcallError::BadRequest(
                "request has no origin or sets noreply; no response would arrive".into(),
            ));
        }
        self.send(req)?;

        loop {
            let changed = self.responses.next_change();
            if let Some(raw) = self.responses.read_if(|head| is_reply_to(head, req)) {
                return decode_response(&raw);
            }
            changed.await;
        }
    }

    /// `call` with an upper bound on the wait.
    pub async fn call_with_timeout(&self, req: &Request, timeout: Duration) -> Result<Response> {
        tokio::time::timeout(timeout, self.call(req))
            .await
            .map_err(|_| PortcallError::Internal(format!("no response within {timeout:?}")))?
    }
}

fn is_reply_to(head: &str, req: &Request) -> bool {
    decode_response(head).map(|r| r.answers(req)).unwrap_or(false)
}
