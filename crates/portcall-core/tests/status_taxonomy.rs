#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use portcall_core::{PortcallError, Status};
use serde_json::json;

#[test]
fn labels_match_codes() {
    let table: Vec<(u16, &str)> = Status::ALL.iter().map(|s| (s.code(), s.label())).collect();
    assert_eq!(
        table,
        vec![
            (102, "Processing"),
            (200, "Ok"),
            (201, "Created"),
            (204, "No Content"),
            (400, "Bad Input"),
            (402, "Payment Required"),
            (404, "Resource Not Found"),
            (409, "Conflict"),
            (412, "Precondition Failed"),
            (500, "Server Error"),
            (501, "Not Implemented"),
            (503, "Service Unavailable"),
        ]
    );
}

#[test]
fn from_code_is_closed() {
    for s in Status::ALL {
        assert_eq!(Status::from_code(s.code()), Some(s));
    }
    assert_eq!(Status::from_code(418), None);
    assert_eq!(Status::from_code(0), None);
}

#[test]
fn serializes_as_code_and_label_object() {
    assert_eq!(
        serde_json::to_value(Status::ServerError).unwrap(),
        json!({ "code": 500, "status": "Server Error" })
    );
    let s: Status = serde_json::from_value(json!({ "code": 204, "status": "No Content" })).unwrap();
    assert_eq!(s, Status::NoContent);
}

#[test]
fn success_boundary() {
    assert!(Status::Processing.is_success());
    assert!(Status::NoContent.is_success());
    assert!(!Status::BadInput.is_success());
    assert_eq!(Status::NotFound.to_string(), "404 Resource Not Found");
}

#[test]
fn error_statuses() {
    assert_eq!(PortcallError::BadRequest("x".into()).status(), Status::BadInput);
    assert_eq!(PortcallError::Decode { message: "x".into() }.status(), Status::BadInput);
    assert_eq!(PortcallError::UnknownEndpoint("x".into()).status(), Status::NotFound);
    assert_eq!(PortcallError::Internal("x".into()).status(), Status::ServerError);
    assert_eq!(PortcallError::UnsupportedVersion.status(), Status::ServerError);
}
