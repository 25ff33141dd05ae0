//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler and the codec that decodes frames once
//! before they are posted to the host frame.

pub mod codec;
pub mod ws;
