//! Top-level facade crate for senbridge.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use senbridge_core::*;
}

pub mod gateway {
    pub use senbridge_gateway::*;
}
