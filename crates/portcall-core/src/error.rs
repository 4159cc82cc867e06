//! Shared error type across portcall crates.

use thiserror::Error;

use crate::status::Status;

/// Shared result type.
pub type Result<T> = std::result::Result<T, PortcallError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PortcallError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("decode failed: {message}")]
    Decode { message: String },
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl PortcallError {
    /// Map an error onto the status a caller would observe for it.
    ///
    /// Anything that is not the caller's fault collapses to `500`, so internal
    /// detail never leaks through the status line.
    pub fn status(&self) -> Status {
        match self {
            PortcallError::BadRequest(_) | PortcallError::Decode { .. } => Status::BadInput,
            PortcallError::UnknownEndpoint(_) => Status::NotFound,
            PortcallError::UnsupportedVersion | PortcallError::Internal(_) => Status::ServerError,
        }
    }
}
