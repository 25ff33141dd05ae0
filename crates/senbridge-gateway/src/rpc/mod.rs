//! Request/response engine over the channel adapter.
//!
//! Re-exports the client and server roles so downstream consumers can
//! depend on this module directly.

pub mod client;
pub mod server;

pub use client::RpcClient;
pub use server::{RequestCtx, RequestHandler, RpcServer};
