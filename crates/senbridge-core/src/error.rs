//! Shared error type across senbridge crates.

use thiserror::Error;

/// Stable error codes surfaced to callers and encoded in HTTP bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid input / malformed message.
    BadRequest,
    /// The target frame could not be reached.
    Channel,
    /// No matching response before the deadline.
    Timeout,
    /// The remote side reported a failure.
    Remote,
    /// The wallet capability failed locally.
    Wallet,
    /// Bearer token rejected.
    Token,
    /// Unsupported protocol or config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Channel => "CHANNEL",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Remote => "REMOTE",
            ErrorCode::Wallet => "WALLET",
            ErrorCode::Token => "TOKEN",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Bearer token failures. Lenient verification collapses all of them to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token id and issuer cannot contain '/'")]
    Separator,
    #[error("malformed bearer: {0}")]
    Parse(String),
    #[error("broken public key")]
    BrokenPublicKey,
    #[error("broken signature")]
    BrokenSignature,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

impl TokenError {
    /// Stable name of the failing condition.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenError::Separator => "SEPARATOR",
            TokenError::Parse(_) => "PARSE_ERROR",
            TokenError::BrokenPublicKey => "BROKEN_PUBLIC_KEY",
            TokenError::BrokenSignature => "BROKEN_SIGNATURE",
            TokenError::InvalidSignature => "INVALID_SIGNATURE",
            TokenError::Expired => "EXPIRED",
        }
    }
}

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("channel error: {0}")]
    Channel(String),
    #[error("request timeout")]
    Timeout,
    #[error("{0}")]
    Remote(String),
    #[error("wallet error: {0}")]
    Wallet(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map internal error to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::BadRequest(_) => ErrorCode::BadRequest,
            BridgeError::Channel(_) => ErrorCode::Channel,
            BridgeError::Timeout => ErrorCode::Timeout,
            BridgeError::Remote(_) => ErrorCode::Remote,
            BridgeError::Wallet(_) => ErrorCode::Wallet,
            BridgeError::Token(_) => ErrorCode::Token,
            BridgeError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            BridgeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
