//! JSON test vector loader shared by envelope tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::fs;

use serde::Deserialize;

/// A raw message that must not decode.
#[derive(Debug, Deserialize)]
pub struct FailureVector {
    pub description: String,
    pub raw: String,
}

/// Read a vector file as text, trimming the trailing newline.
pub fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}"))
        .unwrap_or_else(|e| panic!("missing test vector {name}: {e}"))
        .trim_end()
        .to_owned()
}

pub fn load_failures(name: &str) -> Vec<FailureVector> {
    serde_json::from_str(&load(name)).expect("invalid failure vector file")
}
