//! portcall core: transport-agnostic envelope codec, status taxonomy, and errors.
//!
//! This crate defines the wire-level contracts shared by the server, its
//! endpoints, and client helpers. It intentionally carries no runtime or
//! channel dependencies so it can be reused on either side of a port.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed input surfaces as `ParseFailure`/`PortcallError` so a single bad
//! message can never bring the server down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod status;

/// Shared result type.
pub use error::{PortcallError, Result};
pub use protocol::envelope::{Callback, ParseFailure, Request, Response};
pub use status::Status;
