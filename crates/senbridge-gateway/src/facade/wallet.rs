use async_trait::async_trait;

use senbridge_core::error::{BridgeError, Result};
use senbridge_core::protocol::{SignedMessage, Transaction};
use senbridge_core::token::MemorySigner;

/// Wallet capability supplied by the host application.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// base58 address of the active account.
    async fn get_address(&self) -> Result<String>;

    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction>;

    /// Must return one transaction per input, in input order.
    async fn sign_all_transactions(&self, txs: Vec<Transaction>) -> Result<Vec<Transaction>>;

    async fn sign_message(&self, message: &str) -> Result<SignedMessage>;
}

/// Development wallet: one in-memory ed25519 key.
///
/// Fills its own signer slot and leaves every other slot as it was.
#[derive(Debug, Clone)]
pub struct MemoryWallet {
    signer: MemorySigner,
}

impl MemoryWallet {
    pub fn new(signer: MemorySigner) -> Self {
        Self { signer }
    }

    pub fn generate() -> Self {
        Self::new(MemorySigner::generate())
    }

    pub fn signer(&self) -> &MemorySigner {
        &self.signer
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signer.verifying_key().to_bytes()
    }

    fn sign_in_place(&self, mut tx: Transaction) -> Result<Transaction> {
        let key = self.public_key();
        let signature = self.signer.sign_detached(&tx.message);
        let slot = tx
            .slot_mut(&key)
            .ok_or_else(|| BridgeError::Wallet("wallet is not a required signer".into()))?;
        slot.signature = Some(signature);
        Ok(tx)
    }
}

#[async_trait]
impl Wallet for MemoryWallet {
    async fn get_address(&self) -> Result<String> {
        Ok(self.signer.address())
    }

    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction> {
        self.sign_in_place(tx)
    }

    async fn sign_all_transactions(&self, txs: Vec<Transaction>) -> Result<Vec<Transaction>> {
        txs.into_iter().map(|tx| self.sign_in_place(tx)).collect()
    }

    async fn sign_message(&self, message: &str) -> Result<SignedMessage> {
        Ok(SignedMessage {
            address: self.signer.address(),
            signature: hex::encode(self.signer.sign_detached(message.as_bytes())),
            message: message.to_string(),
        })
    }
}
