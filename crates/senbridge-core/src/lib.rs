//! senbridge core: transport-agnostic protocol primitives, error types, and
//! the bearer token format.
//!
//! This crate defines the wire-level contracts shared by the host gateway and
//! the embedded widget connector, plus the self-contained signed credential
//! (JST bearer) used to prove key ownership to a relying party. It carries no
//! transport or runtime dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths must surface as `BridgeError`/`TokenError` so a hostile
//! peer on the channel cannot crash the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod token;

/// Shared result type.
pub use error::{BridgeError, ErrorCode, Result, TokenError};
