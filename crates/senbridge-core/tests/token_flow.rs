//! Issue / sign / verify flows.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use async_trait::async_trait;
use ed25519_dalek::VerifyingKey;

use senbridge_core::token::{self, Bearer, Jst, MemorySigner, Signer};
use senbridge_core::{BridgeError, Result, TokenError};

/// Returns NaCl-style attached blobs (`signature || message`).
struct AttachedSigner(MemorySigner);

#[async_trait]
impl Signer for AttachedSigner {
    async fn public_key(&self) -> Result<VerifyingKey> {
        self.0.public_key().await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        let mut out = self.0.sign_detached(message).to_vec();
        out.extend_from_slice(message);
        Ok(out)
    }
}

/// Signs whatever it is told to sign, ignoring the requested message.
struct WrongMessageSigner(MemorySigner);

#[async_trait]
impl Signer for WrongMessageSigner {
    async fn public_key(&self) -> Result<VerifyingKey> {
        self.0.public_key().await
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Vec<u8>> {
        let other = b"something else entirely";
        let mut out = self.0.sign_detached(other).to_vec();
        out.extend_from_slice(other);
        Ok(out)
    }
}

struct FailingSigner;

#[async_trait]
impl Signer for FailingSigner {
    async fn public_key(&self) -> Result<VerifyingKey> {
        Err(BridgeError::Wallet("locked".into()))
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Vec<u8>> {
        Err(BridgeError::Wallet("locked".into()))
    }
}

fn replace_segment(bearer: &str, index: usize, segment: &str) -> String {
    let mut parts: Vec<&str> = bearer.split('/').collect();
    parts[index] = segment;
    parts.join("/")
}

#[tokio::test]
async fn sign_then_verify() {
    let signer = MemorySigner::generate();
    let jst = token::issue("hub.sentre.io").unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();

    assert!(token::verify(&bearer));
    let verified = token::verify_strict(&bearer).unwrap();
    assert_eq!(verified.token(), &jst);
    assert_eq!(verified.address(), signer.address());
    assert!(bearer.starts_with(&format!("{}/", signer.address())));
}

#[tokio::test]
async fn attached_signatures_verify() {
    let signer = AttachedSigner(MemorySigner::generate());
    let jst = token::issue("hub.sentre.io").unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();
    assert!(token::verify(&bearer));
}

#[tokio::test]
async fn attached_signature_over_other_message_is_invalid() {
    let signer = WrongMessageSigner(MemorySigner::generate());
    let jst = token::issue("hub.sentre.io").unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();

    assert!(!token::verify(&bearer));
    assert_eq!(token::verify_strict(&bearer).unwrap_err(), TokenError::InvalidSignature);
}

#[tokio::test]
async fn expiry_boundary() {
    let signer = MemorySigner::generate();
    let jst = Jst::new(Jst::rand_id(), "hub.sentre.io", 1_700_000_000, 600).unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();

    assert!(token::verify_at(&bearer, 1_700_000_000 + 600 - 1));
    assert!(!token::verify_at(&bearer, 1_700_000_000 + 600 + 1));
    assert_eq!(
        token::verify_strict_at(&bearer, 1_700_000_000 + 600 + 1).unwrap_err(),
        TokenError::Expired
    );
}

#[tokio::test]
async fn default_ttl_token_expires_after_thirty_days() {
    let signer = MemorySigner::generate();
    let jst = token::issue("hub.sentre.io").unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();

    let past_expiry = jst.created_at() + token::DEFAULT_TTL_SECS + 1;
    assert!(!token::verify_at(&bearer, past_expiry));
    assert_eq!(
        token::verify_strict_at(&bearer, past_expiry).unwrap_err(),
        TokenError::Expired
    );
}

#[test]
fn separator_in_issuer_fails_at_issue() {
    assert_eq!(token::issue("a/b").unwrap_err(), TokenError::Separator);
}

#[tokio::test]
async fn tampered_signature_fails_but_payload_still_parses() {
    let signer = MemorySigner::generate();
    let jst = token::issue("hub.sentre.io").unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();

    let parts: Vec<&str> = bearer.split('/').collect();
    let sig = bs58::decode(parts[1]).into_vec().unwrap();

    for i in [0, 31, 63] {
        let mut flipped = sig.clone();
        flipped[i] ^= 0x01;
        let tampered = replace_segment(&bearer, 1, &bs58::encode(&flipped).into_string());

        assert!(!token::verify(&tampered), "byte {i}");
        let payload = bs58::decode(parts[2]).into_vec().unwrap();
        assert_eq!(Jst::from_bytes(&payload).unwrap(), jst);
    }
}

#[tokio::test]
async fn tampered_payload_fails() {
    let signer = MemorySigner::generate();
    let jst = Jst::new("id", "hub.sentre.io", Jst::now(), 60).unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();

    let forged = Jst::new("id", "evil.example", jst.created_at(), 60).unwrap();
    let tampered = replace_segment(&bearer, 2, &bs58::encode(forged.to_bytes()).into_string());
    assert_eq!(token::verify_strict(&tampered).unwrap_err(), TokenError::InvalidSignature);
}

#[tokio::test]
async fn non_canonical_payload_is_rejected() {
    let signer = MemorySigner::generate();
    let jst = Jst::new("id", "hub.sentre.io", Jst::now(), 600).unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();
    assert!(token::verify(&bearer));

    for payload in [
        format!("id/hub.sentre.io/+{}/600", jst.created_at()),
        format!("id/hub.sentre.io/{}/0600", jst.created_at()),
    ] {
        let rewritten = replace_segment(&bearer, 2, &bs58::encode(payload.as_bytes()).into_string());
        assert!(!token::verify(&rewritten), "{payload}");
        assert!(matches!(token::verify_strict(&rewritten), Err(TokenError::Parse(_))));
    }
}

#[tokio::test]
async fn strict_errors_name_the_failing_condition() {
    let signer = MemorySigner::generate();
    let jst = token::issue("hub.sentre.io").unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();

    assert!(matches!(token::verify_strict("only/two"), Err(TokenError::Parse(_))));
    assert!(matches!(token::verify_strict("a/b/c/d"), Err(TokenError::Parse(_))));
    assert!(matches!(
        token::verify_strict(&replace_segment(&bearer, 0, "0OIl")),
        Err(TokenError::Parse(_))
    ));

    let short_key = replace_segment(&bearer, 0, &bs58::encode([7u8; 5]).into_string());
    assert_eq!(token::verify_strict(&short_key).unwrap_err(), TokenError::BrokenPublicKey);

    let short_sig = replace_segment(&bearer, 1, &bs58::encode([7u8; 10]).into_string());
    assert_eq!(token::verify_strict(&short_sig).unwrap_err(), TokenError::BrokenSignature);

    let other = MemorySigner::generate();
    let wrong_key = replace_segment(&bearer, 0, &other.address());
    assert_eq!(token::verify_strict(&wrong_key).unwrap_err(), TokenError::InvalidSignature);
}

#[tokio::test]
async fn bearer_round_trips_payload_bytes() {
    let signer = MemorySigner::generate();
    let jst = token::issue("hub.sentre.io").unwrap();
    let bearer = token::sign(&jst, &signer).await.unwrap();

    let parsed: Bearer = bearer.parse().unwrap();
    assert_eq!(parsed.to_string(), bearer);
    assert_eq!(parsed.token().to_bytes(), jst.to_bytes());
}

#[tokio::test]
async fn signer_failure_propagates() {
    let jst = token::issue("hub.sentre.io").unwrap();
    let err = token::sign(&jst, &FailingSigner).await.unwrap_err();
    assert_eq!(err.code().as_str(), "WALLET");
}
