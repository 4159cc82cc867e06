//! Dispatcher module exports.
//!
//! Re-exports the dispatcher loop, the endpoint trait, and the registry so
//! downstream consumers can depend on this module directly.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{Dispatcher, Outcome};
pub use registry::{Endpoint, Registry, RegistryBuilder, Reply};
