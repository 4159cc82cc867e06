//! Built-in endpoints.
//!
//! Business endpoints live outside this crate and are handed to
//! `AppState::with_endpoints`; the ones here keep a bare server useful for
//! connectivity checks and introspection.

pub mod echo;
pub mod introspect;
pub mod stubbed;

use std::sync::Arc;

use portcall_core::error::Result;

use crate::dispatch::{Endpoint, Registry};
use crate::obs::DispatchMetrics;

pub use echo::Echo;
pub use introspect::{ListEndpoints, MetricsEndpoint};
pub use stubbed::Stubbed;

/// Built-ins plus `extra`, then the `endpoints` listing over all of them.
pub fn registry(
    metrics: Arc<DispatchMetrics>,
    extra: impl IntoIterator<Item = Arc<dyn Endpoint>>,
) -> Result<Registry> {
    let builder = Registry::builder()
        .register(Arc::new(Echo))
        .register(Arc::new(MetricsEndpoint::new(metrics)))
        .register_all(extra);

    let mut names = builder.names();
    names.push(ListEndpoints::NAME.to_owned());
    names.sort();

    builder.register(Arc::new(ListEndpoints::new(names))).build()
}
