//! Client calls against a live dispatcher task.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use serde_json::{json, Map};
use tokio::sync::oneshot;

use portcall_core::{Callback, PortcallError, Request, Status};
use portcall_server::app_state::AppState;
use portcall_server::client::Client;
use portcall_server::config::ServerConfig;

const WAIT: Duration = Duration::from_secs(5);

fn data(v: serde_json::Value) -> Map<String, serde_json::Value> {
    v.as_object().cloned().unwrap()
}

#[tokio::test]
async fn concurrent_callers_each_get_their_own_reply() {
    let app = AppState::new(ServerConfig::default()).unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let dispatcher = app.dispatcher();
    let server = tokio::spawn(async move {
        dispatcher
            .serve_until(async {
                let _ = stop_rx.await;
            })
            .await
    });

    let client = Client::from_config(&app.hub(), &app.cfg().server);
    let mut calls = Vec::new();
    for i in 0..8u64 {
        let client = client.clone();
        calls.push(tokio::spawn(async move {
            let req = Request::new("echo", format!("host{i}"))
                .with_callback(i)
                .with_data(data(json!({ "i": i })));
            client.call_with_timeout(&req, WAIT).await
        }));
    }

    for (i, call) in calls.into_iter().enumerate() {
        let resp = call.await.unwrap().unwrap();
        assert_eq!(resp.status, Status::Ok);
        assert_eq!(resp.to, format!("host{i}"));
        assert_eq!(resp.callback, Some(Callback::from(i as u64)));
        assert_eq!(resp.data.get("i"), Some(&json!(i)));
    }

    let _ = stop_tx.send(());
    server.await.unwrap();
}

#[tokio::test]
async fn call_sees_404_for_unknown_endpoint() {
    let app = AppState::new(ServerConfig::default()).unwrap();
    let dispatcher = app.dispatcher();
    let server = tokio::spawn(async move { dispatcher.run().await });

    let client = Client::from_config(&app.hub(), &app.cfg().server);
    let resp = client
        .call_with_timeout(&Request::new("calc_hgw", "home").with_callback("t"), WAIT)
        .await
        .unwrap();
    assert_eq!(resp.status, Status::NotFound);
    assert!(resp.data.is_empty());

    server.abort();
}

#[tokio::test]
async fn call_rejects_requests_that_cannot_be_answered() {
    let app = AppState::new(ServerConfig::default()).unwrap();
    let client = Client::from_config(&app.hub(), &app.cfg().server);

    let err = client.call(&Request::new("echo", "")).await.expect_err("no origin");
    assert!(matches!(err, PortcallError::BadRequest(_)));

    let err = client
        .call(&Request::new("echo", "home").with_noreply(true))
        .await
        .expect_err("noreply");
    assert!(matches!(err, PortcallError::BadRequest(_)));
    assert!(app.request_port().is_empty());
}

#[tokio::test]
async fn call_times_out_without_a_server() {
    let app = AppState::new(ServerConfig::default()).unwrap();
    let client = Client::from_config(&app.hub(), &app.cfg().server);
    let err = client
        .call_with_timeout(&Request::new("echo", "home"), Duration::from_millis(50))
        .await
        .expect_err("nobody is serving");
    assert!(matches!(err, PortcallError::Internal(_)));
    assert_eq!(app.request_port().len(), 1);
}
