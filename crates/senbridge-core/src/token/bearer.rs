//! Bearer string: `<base58 address>/<base58 signature>/<base58 token bytes>`.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signature, Verifier, VerifyingKey, SIGNATURE_LENGTH};

use crate::error::{Result, TokenError};
use crate::token::jst::{Jst, SEPARATOR};
use crate::token::signer::Signer;

/// Parsed (not yet verified) bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bearer {
    public_key: Vec<u8>,
    signature: Vec<u8>,
    token: Jst,
}

impl Bearer {
    /// Split on `/` and base58-decode every segment.
    pub fn parse(s: &str) -> std::result::Result<Self, TokenError> {
        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        let [address, signature, payload] = parts.as_slice() else {
            return Err(TokenError::Parse(format!(
                "bearer has {} segments, expected 3",
                parts.len()
            )));
        };

        let public_key = decode_segment("address", address)?;
        let signature = decode_segment("signature", signature)?;
        let token = Jst::from_bytes(&decode_segment("payload", payload)?)?;

        Ok(Self {
            public_key,
            signature,
            token,
        })
    }

    pub fn token(&self) -> &Jst {
        &self.token
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// base58 address as it appeared in the bearer.
    pub fn address(&self) -> String {
        bs58::encode(&self.public_key).into_string()
    }

    pub fn verifying_key(&self) -> std::result::Result<VerifyingKey, TokenError> {
        let bytes: [u8; 32] = self
            .public_key
            .as_slice()
            .try_into()
            .map_err(|_| TokenError::BrokenPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| TokenError::BrokenPublicKey)
    }

    /// Full check at `now`: public key, signature against the seed, expiry.
    pub fn verify_at(&self, now: u64) -> std::result::Result<(), TokenError> {
        let key = self.verifying_key()?;
        open(&key, &self.signature, &self.token.seed())?;
        if self.token.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(())
    }
}

impl fmt::Display for Bearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.address(),
            bs58::encode(&self.signature).into_string(),
            bs58::encode(self.token.to_bytes()).into_string()
        )
    }
}

impl FromStr for Bearer {
    type Err = TokenError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn decode_segment(name: &str, segment: &str) -> std::result::Result<Vec<u8>, TokenError> {
    bs58::decode(segment)
        .into_vec()
        .map_err(|e| TokenError::Parse(format!("{name} is not base58: {e}")))
}

/// Check `signed` against `expected`.
///
/// A detached signature is verified over `expected` directly. An attached
/// blob is opened first, then its recovered message must equal `expected`.
fn open(key: &VerifyingKey, signed: &[u8], expected: &[u8]) -> std::result::Result<(), TokenError> {
    if signed.len() < SIGNATURE_LENGTH {
        return Err(TokenError::BrokenSignature);
    }
    let (sig, message) = signed.split_at(SIGNATURE_LENGTH);
    let sig = Signature::from_slice(sig).map_err(|_| TokenError::BrokenSignature)?;

    if message.is_empty() {
        return key
            .verify(expected, &sig)
            .map_err(|_| TokenError::InvalidSignature);
    }

    key.verify(message, &sig)
        .map_err(|_| TokenError::BrokenSignature)?;
    if message != expected {
        return Err(TokenError::InvalidSignature);
    }
    Ok(())
}

/// Sign `token` with `signer` and serialize the bearer.
pub async fn sign<S: Signer + ?Sized>(token: &Jst, signer: &S) -> Result<String> {
    let public_key = signer.public_key().await?;
    let signature = signer.sign_message(&token.seed()).await?;
    tracing::debug!(issuer = %token.issuer(), "jst signed");

    Ok(Bearer {
        public_key: public_key.as_bytes().to_vec(),
        signature,
        token: token.clone(),
    }
    .to_string())
}

/// Lenient verification against the wall clock.
pub fn verify(bearer: &str) -> bool {
    verify_at(bearer, Jst::now())
}

pub fn verify_at(bearer: &str, now: u64) -> bool {
    verify_strict_at(bearer, now).is_ok()
}

/// Strict verification: the error names the failing condition.
pub fn verify_strict(bearer: &str) -> std::result::Result<Bearer, TokenError> {
    verify_strict_at(bearer, Jst::now())
}

pub fn verify_strict_at(bearer: &str, now: u64) -> std::result::Result<Bearer, TokenError> {
    let parsed = Bearer::parse(bearer)?;
    parsed.verify_at(now)?;
    Ok(parsed)
}
