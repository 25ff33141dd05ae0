#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use senbridge_core::protocol::OperationKind;
use senbridge_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:8080"
timeouts:
  conect_ms: 1000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.host_frame_id, "gateway");
    assert_eq!(cfg.operations, OperationKind::ALL.to_vec());
    assert_eq!(cfg.timeouts.for_kind(OperationKind::Connect), Duration::from_millis(3000));
    assert_eq!(
        cfg.timeouts.for_kind(OperationKind::SignAllTransactions),
        Duration::from_millis(120000)
    );
    assert!(cfg.auth.issuer.is_none());
}

#[test]
fn other_versions_are_unsupported() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn operations_subset_and_duplicates() {
    let ok = r#"
version: 1
operations: [connect, get-address]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.operations, vec![OperationKind::Connect, OperationKind::GetAddress]);

    let dup = r#"
version: 1
operations: [connect, connect]
"#;
    assert!(config::load_from_str(dup).is_err());

    let unknown = r#"
version: 1
operations: [transfer-funds]
"#;
    assert!(config::load_from_str(unknown).is_err());
}

#[test]
fn ranges_are_validated() {
    let idle_below_ping = r#"
version: 1
gateway:
  ping_interval_ms: 30000
  idle_timeout_ms: 20000
"#;
    assert!(config::load_from_str(idle_below_ping).is_err());

    let tiny_timeout = r#"
version: 1
timeouts:
  sign_message_ms: 10
"#;
    assert!(config::load_from_str(tiny_timeout).is_err());

    let bad_listen = r#"
version: 1
gateway:
  listen: "localhost"
"#;
    assert!(config::load_from_str(bad_listen).is_err());
}

#[test]
fn issuer_cannot_contain_separator() {
    let bad = r#"
version: 1
auth:
  issuer: "a/b"
"#;
    assert!(config::load_from_str(bad).is_err());

    let ok = r#"
version: 1
auth:
  issuer: "senhub"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.auth.issuer.as_deref(), Some("senhub"));
}
