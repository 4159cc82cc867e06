#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use portcall_core::PortcallError;
use portcall_server::dispatch::Registry;
use portcall_server::endpoints::{Echo, Stubbed};

#[test]
fn duplicate_names_are_rejected() {
    let err = Registry::builder()
        .register(Arc::new(Echo))
        .register(Arc::new(Stubbed::new("echo")))
        .build()
        .expect_err("echo twice");
    assert!(err.to_string().contains("registered twice"), "{err}");
}

#[test]
fn empty_name_is_rejected() {
    let err = Registry::builder()
        .register(Arc::new(Stubbed::new("")))
        .build()
        .expect_err("empty name");
    assert!(matches!(err, PortcallError::BadRequest(_)));
}

#[test]
fn lookup_is_exact() {
    let registry = Registry::builder()
        .register(Arc::new(Echo))
        .register(Arc::new(Stubbed::new("calc_hgw")))
        .build()
        .unwrap();

    assert_eq!(registry.len(), 2);
    assert!(registry.contains("echo"));
    assert!(!registry.contains("ECHO"));
    assert!(registry.lookup("echo ").is_err());
    assert_eq!(registry.lookup("calc_hgw").unwrap().name(), "calc_hgw");
    assert!(matches!(
        registry.lookup("nope"),
        Err(PortcallError::UnknownEndpoint(name)) if name == "nope"
    ));
    assert_eq!(registry.names(), vec!["calc_hgw", "echo"]);
}
