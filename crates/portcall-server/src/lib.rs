//! portcall server library entry.
//!
//! This crate wires the port model, endpoint registry, dispatcher loop, and
//! built-in endpoints into a runnable server. It is intended to be consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod endpoints;
pub mod obs;
pub mod transport;
