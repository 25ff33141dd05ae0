//! JSON-side helpers for binary-safe payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::protocol::transaction::Transaction;

/// Raw bytes carried as a base64 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireBytes(pub Bytes);

impl WireBytes {
    pub fn from_transaction(tx: &Transaction) -> Result<Self> {
        Ok(Self(tx.encode()?))
    }

    pub fn into_transaction(self) -> Result<Transaction> {
        Transaction::decode(self.0)
    }
}

impl Serialize for WireBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for WireBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s.as_bytes())
            .map(|v| WireBytes(Bytes::from(v)))
            .map_err(serde::de::Error::custom)
    }
}

/// Result of `sign-message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedMessage {
    /// base58 address of the signing key.
    pub address: String,
    /// hex-encoded detached signature.
    pub signature: String,
    /// The raw message that was signed.
    pub message: String,
}
