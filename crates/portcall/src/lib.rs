//! Top-level facade crate for portcall.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use portcall_core::*;
}

pub mod server {
    pub use portcall_server::*;
}
