//! Request/response envelopes (JSON).
//!
//! Request on the wire:
//! `{"endpoint": str, "from": str, "callback": str|num|null, "noreply": bool, "data": {..}}`
//!
//! Response on the wire:
//! `{"to": str, "status": {"code": int, "status": str}, "data": {..}, "callback": str|num|null}`
//!
//! Only `endpoint` is mandatory in a request. `from`, `callback`, `noreply` and
//! `data` fall back to their empty values when absent or `null`. Both
//! envelopes are JSON objects; any other top-level value is rejected.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{PortcallError, Result};
use crate::status::Status;

/// Opaque correlation token, echoed back verbatim.
///
/// Numbers keep their exact digits (`serde_json` is built with
/// `arbitrary_precision`), so integers beyond 64 bits survive the trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Callback {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Callback {
    fn deserialize<D>(de: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(de)? {
            Value::String(s) => Ok(Callback::Text(s)),
            Value::Number(n) => Ok(Callback::Number(n)),
            other => Err(D::Error::custom(format!(
                "callback must be a string, number or null, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<&str> for Callback {
    fn from(s: &str) -> Self {
        Callback::Text(s.to_owned())
    }
}

impl From<String> for Callback {
    fn from(s: String) -> Self {
        Callback::Text(s)
    }
}

impl From<u64> for Callback {
    fn from(n: u64) -> Self {
        Callback::Number(n.into())
    }
}

/// Client -> server envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Endpoint name (exact, case-sensitive).
    pub endpoint: String,
    /// Return address (field name is `from` in JSON). Empty means "never reply".
    #[serde(rename = "from", default, deserialize_with = "null_as_default")]
    pub origin: String,
    #[serde(default)]
    pub callback: Option<Callback>,
    /// Opaque payload handed to the endpoint.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub noreply: bool,
}

impl Request {
    pub fn new(endpoint: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            origin: origin.into(),
            ..Self::default()
        }
    }

    pub fn with_callback(mut self, callback: impl Into<Callback>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_noreply(mut self, noreply: bool) -> Self {
        self.noreply = noreply;
        self
    }

    /// A reply is transmitted only when there is a return address and the
    /// caller did not opt out.
    pub fn wants_reply(&self) -> bool {
        !self.origin.is_empty() && !self.noreply
    }
}

/// Server -> client envelope. All four fields are always serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub to: String,
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub callback: Option<Callback>,
}

impl Response {
    /// Build the reply for `req`; `to` and `callback` are copied unchanged.
    pub fn reply_to(req: &Request, status: Status, data: Map<String, Value>) -> Self {
        Self {
            to: req.origin.clone(),
            status,
            data,
            callback: req.callback.clone(),
        }
    }

    /// Reply with an empty data object (error paths).
    pub fn empty(req: &Request, status: Status) -> Self {
        Self::reply_to(req, status, Map::new())
    }

    /// Whether this response answers `req` (same return address and token).
    pub fn answers(&self, req: &Request) -> bool {
        self.to == req.origin && self.callback == req.callback
    }
}

/// A request that could not be decoded. Terminal for that message.
#[derive(Debug, Clone, Error)]
#[error("cannot parse message content: {message}")]
pub struct ParseFailure {
    /// The raw message text as read from the port.
    pub raw: String,
    /// Diagnostic from the JSON parser.
    pub message: String,
}

impl ParseFailure {
    /// The defaulted request a failed decode stands for
    /// (`endpoint=""`, `origin=""`, `callback=null`, `data={}`, `noreply=false`).
    pub fn request(&self) -> Request {
        Request::default()
    }
}

impl From<ParseFailure> for PortcallError {
    fn from(f: ParseFailure) -> Self {
        PortcallError::Decode { message: f.message }
    }
}

/// Decode a request. Never panics: structural failures, a non-object
/// message, and a missing `endpoint` all come back as `ParseFailure`.
pub fn decode(raw: &str) -> std::result::Result<Request, ParseFailure> {
    let fail = |message: String| ParseFailure {
        raw: raw.to_owned(),
        message,
    };

    // Parse to a value first: derived struct impls would also accept a
    // positional array.
    let value: Value = serde_json::from_str(raw).map_err(|e| fail(e.to_string()))?;
    if !value.is_object() {
        return Err(fail(format!(
            "request must be a JSON object, got {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| fail(e.to_string()))
}

/// Encode a response as a single line of JSON.
pub fn encode(resp: &Response) -> Result<String> {
    serde_json::to_string(resp)
        .map_err(|e| PortcallError::Internal(format!("response encode failed: {e}")))
}

/// Encode a request (client side).
pub fn encode_request(req: &Request) -> Result<String> {
    serde_json::to_string(req)
        .map_err(|e| PortcallError::Internal(format!("request encode failed: {e}")))
}

/// Decode a response (client side). Same object-only rule as requests.
pub fn decode_response(raw: &str) -> Result<Response> {
    let decode_err = |message: String| PortcallError::Decode { message };
    let value: Value = serde_json::from_str(raw).map_err(|e| decode_err(e.to_string()))?;
    if !value.is_object() {
        return Err(decode_err(format!(
            "response must be a JSON object, got {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| decode_err(e.to_string()))
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn null_as_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}
