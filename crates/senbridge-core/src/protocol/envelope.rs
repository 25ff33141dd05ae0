//! Marker-tagged envelope (JSON).
//!
//! `{ "type": "sentre", "payload": <Request|Response> }`. Anything with a
//! different or missing marker is inert traffic and is never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, Result};

/// Protocol constant stamped on every outgoing envelope.
pub const PROTOCOL_MARKER: &str = "sentre";

/// Envelope around one bridge payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Protocol marker (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub marker: String,
    pub payload: T,
}

/// Wrap a payload into a marked envelope value.
pub fn seal<T: Serialize>(payload: &T) -> Result<Value> {
    let env = Envelope {
        marker: PROTOCOL_MARKER.to_string(),
        payload,
    };
    serde_json::to_value(&env)
        .map_err(|e| BridgeError::BadRequest(format!("envelope encode failed: {e}")))
}

/// Return the payload iff `raw` is a correctly marked envelope.
pub fn open(raw: &Value) -> Option<&Value> {
    if raw.get("type").and_then(Value::as_str) != Some(PROTOCOL_MARKER) {
        return None;
    }
    raw.get("payload")
}
