//! senbridge gateway library entry.
//!
//! This crate wires the channel adapter, the request/response engine, the
//! wallet façades, and the WebSocket transport into a gateway stack. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod channel;
pub mod config;
pub mod facade;
pub mod ops;
pub mod router;
pub mod rpc;
pub mod transport;
