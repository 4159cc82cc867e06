//! Single-consumer dispatch loop.
//!
//! WAIT -> READ -> DECODE -> ROUTE -> EXECUTE -> REPLY_DECISION -> SEND, one
//! message at a time. Waiting on an empty request port is the only place the
//! loop suspends. No failure inside an iteration ends the loop: parse
//! failures are dropped, unknown endpoints answer `404`, endpoint faults and
//! panics answer `500`.
//!
//! Endpoints run strictly one after another. A slow endpoint delays every
//! request queued behind it; replies leave in request order.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use portcall_core::protocol::{decode, encode, ParseFailure, Request, Response};
use portcall_core::Status;

use crate::dispatch::Registry;
use crate::obs::DispatchMetrics;
use crate::transport::Port;

/// Metrics label used for names missing from the registry, so arbitrary
/// client input cannot grow the label set.
const UNKNOWN_ENDPOINT_LABEL: &str = "<unknown>";

/// What one pass over a raw message decided.
#[derive(Debug)]
pub enum Outcome {
    /// The message did not decode; nothing is sent.
    Dropped(ParseFailure),
    /// A response was computed but the caller gave no origin or set `noreply`.
    Suppressed(Response),
    /// The response must be written to the response port.
    Deliver(Response),
}

impl Outcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Outcome::Dropped(_) => None,
            Outcome::Suppressed(r) | Outcome::Deliver(r) => Some(r),
        }
    }
}

pub struct Dispatcher {
    registry: Arc<Registry>,
    requests: Arc<Port>,
    responses: Arc<Port>,
    metrics: Arc<DispatchMetrics>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<Registry>,
        requests: Arc<Port>,
        responses: Arc<Port>,
        metrics: Arc<DispatchMetrics>,
    ) -> Self {
        Self {
            registry,
            requests,
            responses,
            metrics,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Serve forever. Only process termination stops this loop.
    pub async fn run(&self) {
        self.log_listening();
        loop {
            let raw = self.requests.recv().await;
            self.dispatch(&raw).await;
        }
    }

    /// Serve until `shutdown` resolves. Shutdown is only observed between
    /// messages, never while an endpoint runs; messages already queued at
    /// that point are still processed before returning.
    pub async fn serve_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.log_listening();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                raw = self.requests.recv() => self.dispatch(&raw).await,
            }
        }

        let drained = self.drain().await;
        info!(port = self.requests.id(), drained, "dispatcher stopped");
    }

    /// Process every message currently queued, without waiting for more.
    /// Returns how many messages were taken off the request port.
    pub async fn drain(&self) -> usize {
        let mut n = 0;
        while let Some(raw) = self.requests.read() {
            self.dispatch(&raw).await;
            n += 1;
        }
        n
    }

    /// One full iteration for a message already read from the request port.
    pub async fn dispatch(&self, raw: &str) {
        if let Outcome::Deliver(resp) = self.process(raw).await {
            self.send(&resp);
        }
    }

    /// DECODE -> ROUTE -> EXECUTE -> REPLY_DECISION, without touching ports.
    pub async fn process(&self, raw: &str) -> Outcome {
        let mut req = match decode(raw) {
            Ok(req) => req,
            Err(failure) => {
                warn!(raw = %failure.raw, error = %failure.message, "skipping invalid request");
                self.metrics.parse_failures.inc(&[]);
                return Outcome::Dropped(failure);
            }
        };

        info!(
            endpoint = %req.endpoint,
            origin = %req.origin,
            callback = ?req.callback,
            "handling request"
        );

        let data = std::mem::take(&mut req.data);
        let (status, data) = self.execute(&req, data).await;
        let resp = Response::reply_to(&req, status, data);

        if req.wants_reply() {
            Outcome::Deliver(resp)
        } else {
            info!(
                endpoint = %req.endpoint,
                code = status.code(),
                noreply = req.noreply,
                "reply computed but suppressed"
            );
            self.metrics.replies.inc(&[("outcome", "suppressed")]);
            Outcome::Suppressed(resp)
        }
    }

    async fn execute(&self, req: &Request, data: Map<String, Value>) -> (Status, Map<String, Value>) {
        let endpoint = match self.registry.lookup(&req.endpoint) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!(error = %e, "unknown endpoint requested");
                self.record(UNKNOWN_ENDPOINT_LABEL, e.status());
                return (e.status(), Map::new());
            }
        };

        let name = req.endpoint.as_str();
        let started = Instant::now();
        // `handle` may panic before it returns a future; call it inside the guard.
        let result = AssertUnwindSafe(async move { endpoint.handle(data).await })
            .catch_unwind()
            .await;
        self.metrics
            .handle_duration
            .observe(&[("endpoint", name)], started.elapsed());

        let (status, data) = match result {
            Ok(Ok(reply)) => (reply.status, reply.data),
            Ok(Err(e)) => {
                error!(endpoint = %name, error = %e, "endpoint failed");
                self.metrics.handler_faults.inc(&[("endpoint", name)]);
                (Status::ServerError, Map::new())
            }
            Err(panic) => {
                error!(endpoint = %name, panic = %panic_message(&*panic), "endpoint panicked");
                self.metrics.handler_faults.inc(&[("endpoint", name)]);
                (Status::ServerError, Map::new())
            }
        };
        self.record(name, status);
        (status, data)
    }

    fn record(&self, endpoint: &str, status: Status) {
        let code = status.code().to_string();
        self.metrics
            .requests
            .inc(&[("endpoint", endpoint), ("code", code.as_str())]);
    }

    fn send(&self, resp: &Response) {
        let text = match encode(resp) {
            Ok(text) => text,
            Err(e) => {
                error!(to = %resp.to, error = %e, "cannot encode response");
                return;
            }
        };

        if let Some(evicted) = self.responses.write(text) {
            warn!(port = self.responses.id(), evicted = %evicted, "response port full; oldest reply evicted");
            let port = self.responses.id().to_string();
            self.metrics.evictions.inc(&[("port", port.as_str())]);
        }
        self.metrics.replies.inc(&[("outcome", "sent")]);

        if resp.status.is_success() {
            info!(to = %resp.to, callback = ?resp.callback, code = resp.status.code(), "response sent");
        } else {
            warn!(to = %resp.to, callback = ?resp.callback, code = resp.status.code(), "response sent");
        }
    }

    fn log_listening(&self) {
        info!(port = self.requests.id(), "now listening");
        info!(port = self.responses.id(), "responses will be sent");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
