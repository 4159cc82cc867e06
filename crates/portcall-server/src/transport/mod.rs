//! Transport layer: the port model and the stdio host bridge.

pub mod port;
pub mod stdio;

pub use port::{Port, PortHub};
