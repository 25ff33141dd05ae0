//! Transaction frame parsing (panic-free).
//!
//! Layout:
//! `u8 version | u8 signer_count | signer_count x (32B key | u8 flag | 64B sig iff flag=1) | message`
//!
//! Parsing rules:
//! - Never index (`buf[0]`); always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{BridgeError, Result};

/// Only supported frame version.
pub const TX_FRAME_VERSION: u8 = 1;

const FLAG_UNSIGNED: u8 = 0;
const FLAG_SIGNED: u8 = 1;

/// One required signer and its signature, if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerSlot {
    pub public_key: [u8; 32],
    pub signature: Option<[u8; 64]>,
}

/// Opaque-to-the-bridge transaction: signer slots plus the signed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signers: Vec<SignerSlot>,
    /// Bytes every signer signs (zero-copy).
    pub message: Bytes,
}

impl Transaction {
    /// Unsigned transaction requiring the given signers.
    pub fn new(signers: impl IntoIterator<Item = [u8; 32]>, message: impl Into<Bytes>) -> Self {
        Self {
            signers: signers
                .into_iter()
                .map(|public_key| SignerSlot {
                    public_key,
                    signature: None,
                })
                .collect(),
            message: message.into(),
        }
    }

    pub fn signed_count(&self) -> usize {
        self.signers.iter().filter(|s| s.signature.is_some()).count()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.signers.iter().all(|s| s.signature.is_some())
    }

    /// Slot for `public_key`, if it is a required signer.
    pub fn slot_mut(&mut self, public_key: &[u8; 32]) -> Option<&mut SignerSlot> {
        self.signers.iter_mut().find(|s| &s.public_key == public_key)
    }

    /// Encode without requiring all signatures.
    pub fn encode(&self) -> Result<Bytes> {
        let count = u8::try_from(self.signers.len())
            .map_err(|_| BridgeError::BadRequest("too many signers".into()))?;

        let mut buf = BytesMut::with_capacity(2 + self.signers.len() * 97 + self.message.len());
        buf.put_u8(TX_FRAME_VERSION);
        buf.put_u8(count);
        for slot in &self.signers {
            buf.put_slice(&slot.public_key);
            match &slot.signature {
                Some(sig) => {
                    buf.put_u8(FLAG_SIGNED);
                    buf.put_slice(sig);
                }
                None => buf.put_u8(FLAG_UNSIGNED),
            }
        }
        buf.put_slice(&self.message);
        Ok(buf.freeze())
    }

    /// Decode a transaction frame from bytes.
    pub fn decode(mut buf: Bytes) -> Result<Self> {
        // Minimum header: version, signer_count
        if buf.remaining() < 2 {
            return Err(BridgeError::BadRequest("transaction frame too short".into()));
        }

        let version = buf.get_u8();
        if version != TX_FRAME_VERSION {
            return Err(BridgeError::UnsupportedVersion);
        }

        let count = buf.get_u8() as usize;
        let mut signers = Vec::with_capacity(count);
        for i in 0..count {
            if buf.remaining() < 33 {
                return Err(BridgeError::BadRequest(format!(
                    "signer {i} truncated"
                )));
            }
            let mut public_key = [0u8; 32];
            buf.copy_to_slice(&mut public_key);

            let signature = match buf.get_u8() {
                FLAG_UNSIGNED => None,
                FLAG_SIGNED => {
                    if buf.remaining() < 64 {
                        return Err(BridgeError::BadRequest(format!(
                            "signer {i} flagged signed but signature missing"
                        )));
                    }
                    let mut sig = [0u8; 64];
                    buf.copy_to_slice(&mut sig);
                    Some(sig)
                }
                other => {
                    return Err(BridgeError::BadRequest(format!(
                        "signer {i} has invalid flag {other}"
                    )))
                }
            };
            signers.push(SignerSlot {
                public_key,
                signature,
            });
        }

        // Remaining bytes are the message.
        let message = buf.copy_to_bytes(buf.remaining());

        Ok(Self { signers, message })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn partially_signed_survives_encoding() {
        let mut tx = Transaction::new([[1u8; 32], [2u8; 32]], &b"transfer 5"[..]);
        tx.slot_mut(&[2u8; 32]).unwrap().signature = Some([9u8; 64]);

        let decoded = Transaction::decode(tx.encode().unwrap()).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.signed_count(), 1);
        assert!(!decoded.is_fully_signed());
    }

    #[test]
    fn rejects_too_many_signers() {
        let tx = Transaction::new((0..=255u8).map(|i| [i; 32]), Bytes::new());
        let err = tx.encode().unwrap_err();
        assert_eq!(err.code().as_str(), "BAD_REQUEST");
    }
}
