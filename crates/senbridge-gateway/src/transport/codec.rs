//! Decode-once codec for the WebSocket transport.
//!
//! - Text frames => JSON value (marker filtering happens in the messenger)
//! - Binary frames are not part of the bridge protocol and are surfaced only
//!   so the session can drop them
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use serde_json::Value;

use senbridge_core::error::{BridgeError, Result};
use senbridge_core::protocol::envelope;

#[derive(Debug)]
pub enum Inbound {
    Text { value: Value, bytes_len: usize },
    Binary { bytes_len: usize },
    Ping(Vec<u8>),
    Pong,
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => {
            let bytes_len = s.len();
            let value: Value = serde_json::from_str(&s)
                .map_err(|e| BridgeError::BadRequest(format!("invalid json frame: {e}")))?;
            Ok(Inbound::Text { value, bytes_len })
        }
        Message::Binary(b) => Ok(Inbound::Binary { bytes_len: b.len() }),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

/// Cheap frame length (policy before decode).
pub fn frame_len(msg: &Message) -> usize {
    match msg {
        Message::Text(s) => s.len(),
        Message::Binary(b) => b.len(),
        Message::Ping(v) => v.len(),
        Message::Pong(v) => v.len(),
        Message::Close(_) => 0,
    }
}

/// True when `value` is a marked envelope whose `targetId` names a widget
/// other than the one bound to this socket.
pub fn spoofs_target(value: &Value, session_target: &str) -> bool {
    envelope::open(value)
        .and_then(|payload| payload.get("targetId"))
        .and_then(Value::as_str)
        .is_some_and(|claimed| claimed != session_target)
}
