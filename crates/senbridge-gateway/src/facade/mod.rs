//! Capability façades.
//!
//! - `WalletGateway` (host side): fixed routing table from operation kind to
//!   the host's [`Wallet`]; wallet failures are encoded as `{ "error": .. }`.
//! - `WalletConnector` (widget side): typed calls with per-operation
//!   deadlines, decoding those failures back into `BridgeError::Remote`.

pub mod connector;
pub mod gateway;
pub mod wallet;

pub use connector::WalletConnector;
pub use gateway::WalletGateway;
pub use wallet::{MemoryWallet, Wallet};
