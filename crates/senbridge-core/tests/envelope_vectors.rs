//! Envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde::Deserialize;
use serde_json::Value;

use senbridge_core::protocol::{open, OperationKind, Request, Response};

mod vector_loader;
use vector_loader::load_str;

fn load_value(name: &str) -> Value {
    serde_json::from_str(&load_str(name)).unwrap()
}

#[test]
fn parse_request_envelope() {
    let raw = load_value("envelope_request.json");
    let payload = open(&raw).expect("marked envelope");
    let req = Request::deserialize(payload).unwrap();
    assert_eq!(req.operation_kind, OperationKind::SignMessage);
    assert_eq!(req.target_id, "senhub-iframe");
    assert_eq!(req.correlation_id, 101);
    assert_eq!(req.data.as_ref().and_then(Value::as_str), Some("hello"));
    assert!(Response::deserialize(payload).is_err());
}

#[test]
fn parse_response_envelope() {
    let raw = load_value("envelope_response.json");
    let payload = open(&raw).expect("marked envelope");
    let resp = Response::deserialize(payload).unwrap();
    assert!(resp.answers(OperationKind::GetAddress, 102));
    assert!(!resp.answers(OperationKind::GetAddress, 101));
    assert!(!resp.answers(OperationKind::Connect, 102));
    assert!(Request::deserialize(payload).is_err());
}

#[test]
fn foreign_traffic_is_inert() {
    let raw = load_value("envelope_foreign.json");
    assert!(open(&raw).is_none());
}
