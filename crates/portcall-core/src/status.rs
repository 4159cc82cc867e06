//! Closed outcome taxonomy attached to every response.
//!
//! On the wire a status is an object `{"code": <int>, "status": <label>}`.
//! The set is fixed; decoding an unknown code is an error rather than a
//! fallback.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PortcallError;

/// Outcome codes shared by endpoints and the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "StatusWire", try_from = "StatusWire")]
#[repr(u16)]
pub enum Status {
    /// Accepted, long-running. Informational; never emitted by the dispatcher.
    Processing = 102,

    Ok = 200,
    /// A new resource was created by the endpoint.
    Created = 201,
    /// Success with nothing to return.
    NoContent = 204,

    /// Malformed or insufficient request data.
    BadInput = 400,
    /// Caller lacks a resource precondition tied to cost.
    PaymentRequired = 402,
    /// Endpoint name not registered.
    NotFound = 404,
    /// Endpoint-detected state conflict.
    Conflict = 409,
    /// A required capability is missing.
    PreconditionFailed = 412,

    /// Unhandled fault inside an endpoint or the dispatcher.
    ServerError = 500,
    /// Registered but intentionally stubbed.
    NotImplemented = 501,
    /// A dependency the endpoint called is unavailable.
    ServiceUnavailable = 503,
}

impl Status {
    /// Every member of the taxonomy, in code order.
    pub const ALL: [Status; 12] = [
        Status::Processing,
        Status::Ok,
        Status::Created,
        Status::NoContent,
        Status::BadInput,
        Status::PaymentRequired,
        Status::NotFound,
        Status::Conflict,
        Status::PreconditionFailed,
        Status::ServerError,
        Status::NotImplemented,
        Status::ServiceUnavailable,
    ];

    /// Numeric code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Human-readable label used in JSON responses.
    pub fn label(self) -> &'static str {
        match self {
            Status::Processing => "Processing",
            Status::Ok => "Ok",
            Status::Created => "Created",
            Status::NoContent => "No Content",
            Status::BadInput => "Bad Input",
            Status::PaymentRequired => "Payment Required",
            Status::NotFound => "Resource Not Found",
            Status::Conflict => "Conflict",
            Status::PreconditionFailed => "Precondition Failed",
            Status::ServerError => "Server Error",
            Status::NotImplemented => "Not Implemented",
            Status::ServiceUnavailable => "Service Unavailable",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Codes below 400 count as success for logging purposes.
    pub fn is_success(self) -> bool {
        self.code() < 400
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.label())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StatusWire {
    code: u16,
    status: String,
}

impl From<Status> for StatusWire {
    fn from(s: Status) -> Self {
        Self {
            code: s.code(),
            status: s.label().to_owned(),
        }
    }
}

impl TryFrom<StatusWire> for Status {
    type Error = PortcallError;

    fn try_from(w: StatusWire) -> Result<Self, Self::Error> {
        Status::from_code(w.code)
            .ok_or_else(|| PortcallError::BadRequest(format!("unknown status code: {}", w.code)))
    }
}
