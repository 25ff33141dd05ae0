//! Correlated request/response payloads.
//!
//! A response matches a pending request iff both `operationKind` and
//! `correlationId` are equal. Both structs deny unknown fields, so a request
//! (which carries `targetId`) never parses as a response and vice versa.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Connect,
    GetAddress,
    SignTransaction,
    SignAllTransactions,
    SignMessage,
}

impl OperationKind {
    /// Every operation, in protocol order.
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Connect,
        OperationKind::GetAddress,
        OperationKind::SignTransaction,
        OperationKind::SignAllTransactions,
        OperationKind::SignMessage,
    ];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Connect => "connect",
            OperationKind::GetAddress => "get-address",
            OperationKind::SignTransaction => "sign-transaction",
            OperationKind::SignAllTransactions => "sign-all-transactions",
            OperationKind::SignMessage => "sign-message",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Widget -> host request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Request {
    pub operation_kind: OperationKind,
    /// Which widget instance asked (and receives the response).
    pub target_id: String,
    pub correlation_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Host -> widget response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Response {
    pub operation_kind: OperationKind,
    pub correlation_id: u64,
    pub data: Value,
}

impl Response {
    /// Whether this response answers the call `(kind, correlation_id)`.
    pub fn answers(&self, kind: OperationKind, correlation_id: u64) -> bool {
        self.operation_kind == kind && self.correlation_id == correlation_id
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn request_never_parses_as_response() {
        let req = json!({
            "operationKind": "get-address",
            "targetId": "app-iframe",
            "correlationId": 7,
            "data": null
        });
        assert!(Response::deserialize(&req).is_err());
        let parsed = Request::deserialize(&req).unwrap();
        assert_eq!(parsed.operation_kind, OperationKind::GetAddress);
        assert!(parsed.data.is_none());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let req = json!({ "operationKind": "format-disk", "targetId": "x", "correlationId": 1 });
        assert!(Request::deserialize(&req).is_err());
    }

    #[test]
    fn kind_wire_names_match_serde() {
        for kind in OperationKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }
}
