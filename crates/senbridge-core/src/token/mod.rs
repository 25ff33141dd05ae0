//! Signed bearer tokens (JST).
//!
//! Pure, stateless functions: issue a time-boxed claim, sign its seed through
//! an external [`Signer`], and verify a bearer string from nothing but its own
//! bytes and the wall clock. No session store, no key custody.

pub mod bearer;
pub mod jst;
pub mod signer;

pub use bearer::{sign, verify, verify_at, verify_strict, verify_strict_at, Bearer};
pub use jst::{Jst, DEFAULT_TTL_SECS, SEPARATOR};
pub use signer::{MemorySigner, Signer};

use crate::error::TokenError;

/// Issue an unsigned token for `issuer` with the default thirty-day ttl.
pub fn issue(issuer: &str) -> Result<Jst, TokenError> {
    Jst::issue(issuer, DEFAULT_TTL_SECS)
}

/// Issue an unsigned token for `issuer` with an explicit ttl.
pub fn issue_with_ttl(issuer: &str, ttl: u64) -> Result<Jst, TokenError> {
    Jst::issue(issuer, ttl)
}
