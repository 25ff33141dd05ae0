//! Bridge wire protocol.
//!
//! Layers, outermost first:
//! - Envelope: marker-tagged wrapper that separates bridge traffic from any
//!   other message sharing the channel.
//! - Rpc: correlated `Request`/`Response` payloads keyed by operation kind.
//! - Transaction: compact binary frame for (partially) signed transactions,
//!   carried as base64 inside JSON via the `wire` helpers.
//!
//! All parsers are panic-free: malformed input is reported as `BridgeError`
//! or silently ignored (for unmarked traffic), never as a panic.

pub mod envelope;
pub mod rpc;
pub mod transaction;
pub mod wire;

pub use envelope::{open, seal, PROTOCOL_MARKER};
pub use rpc::{OperationKind, Request, Response};
pub use transaction::{SignerSlot, Transaction};
pub use wire::{SignedMessage, WireBytes};
