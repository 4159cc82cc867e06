//! Wire formats exchanged over the request and response ports.
//!
//! Both directions carry UTF-8 JSON text. Decoding is panic-free: a malformed
//! request becomes a `ParseFailure` carrying the raw text and a diagnostic,
//! never an unwind out of the dispatcher.

pub mod envelope;

pub use envelope::{
    decode, decode_response, encode, encode_request, Callback, ParseFailure, Request, Response,
};
