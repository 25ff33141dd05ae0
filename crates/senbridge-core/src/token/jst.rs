//! JST: the time-boxed identity claim embedded in a bearer.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;
use sha2::{Digest, Sha512};

use crate::error::TokenError;

/// Separator between serialized fields.
pub const SEPARATOR: char = '/';

/// Thirty days, in seconds.
pub const DEFAULT_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Random id length, in bytes before base58.
const ID_LEN: usize = 32;

/// Immutable claim: `id/issuer/created_at/ttl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jst {
    id: String,
    issuer: String,
    created_at: u64,
    ttl: u64,
}

impl Jst {
    /// Build a token. `id` and `issuer` must not contain [`SEPARATOR`].
    pub fn new(
        id: impl Into<String>,
        issuer: impl Into<String>,
        created_at: u64,
        ttl: u64,
    ) -> Result<Self, TokenError> {
        let id = id.into();
        let issuer = issuer.into();
        if id.contains(SEPARATOR) || issuer.contains(SEPARATOR) {
            return Err(TokenError::Separator);
        }
        Ok(Self {
            id,
            issuer,
            created_at,
            ttl,
        })
    }

    /// Fresh token with a random id, created now.
    pub fn issue(issuer: impl Into<String>, ttl: u64) -> Result<Self, TokenError> {
        Self::new(Self::rand_id(), issuer, Self::now(), ttl)
    }

    /// base58 of 32 random bytes.
    pub fn rand_id() -> String {
        let mut buf = [0u8; ID_LEN];
        rand::thread_rng().fill_bytes(&mut buf);
        bs58::encode(buf).into_string()
    }

    /// Current unix time in seconds.
    pub fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.ttl)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Self::now())
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at()
    }

    /// Canonical byte serialization.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.id, self.issuer, self.created_at, self.ttl
        )
        .into_bytes()
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, TokenError> {
        let s = std::str::from_utf8(buf)
            .map_err(|e| TokenError::Parse(format!("token is not utf8: {e}")))?;

        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        let [id, issuer, created_at, ttl] = parts.as_slice() else {
            return Err(TokenError::Parse(format!(
                "token has {} fields, expected 4",
                parts.len()
            )));
        };

        let created_at = created_at
            .parse()
            .map_err(|_| TokenError::Parse(format!("invalid created_at: {created_at}")))?;
        let ttl = ttl
            .parse()
            .map_err(|_| TokenError::Parse(format!("invalid ttl: {ttl}")))?;

        let jst = Self::new(*id, *issuer, created_at, ttl)?;
        // Only canonical bytes round-trip through to_bytes.
        if jst.to_bytes() != buf {
            return Err(TokenError::Parse("token bytes are not canonical".into()));
        }
        Ok(jst)
    }

    /// SHA-512 of the canonical bytes.
    pub fn digest(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out.copy_from_slice(&Sha512::digest(self.to_bytes()));
        out
    }

    /// Message the holder signs: readable, names the issuer, binds the digest.
    pub fn seed(&self) -> Vec<u8> {
        format!(
            "{} requests proof of key ownership.\nDigest: {}",
            self.issuer,
            bs58::encode(self.digest()).into_string()
        )
        .into_bytes()
    }
}
