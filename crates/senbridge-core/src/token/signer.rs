//! Signing capability consumed by the token module (and the dev wallet).

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use rand::RngCore;

use crate::error::Result;

/// Sole holder of signing authority. The bridge never sees private keys.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn public_key(&self) -> Result<VerifyingKey>;

    /// Signature over `message`: either a detached 64-byte signature or
    /// an attached `signature || message` blob.
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// In-memory ed25519 signer for development and testing.
#[derive(Clone)]
pub struct MemorySigner {
    signing_key: SigningKey,
}

impl MemorySigner {
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Signer with a freshly generated key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::new(SigningKey::from_bytes(&bytes))
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self::new(SigningKey::from_bytes(bytes))
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// base58 of the public key.
    pub fn address(&self) -> String {
        bs58::encode(self.verifying_key().as_bytes()).into_string()
    }

    /// Detached signature, synchronously.
    pub fn sign_detached(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for MemorySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for MemorySigner {
    async fn public_key(&self) -> Result<VerifyingKey> {
        Ok(self.verifying_key())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.sign_detached(message).to_vec())
    }
}
