//! Error types for the licensing module.

use keyward_crypto::CryptoError;
use serde::Serialize;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// A token could not be parsed, authenticated or decoded.
    #[error("invalid token: {0}")]
    Token(#[from] CryptoError),

    /// The device identifier could not be determined.
    #[error("device identity unavailable: {0}")]
    Identity(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Network error while talking to the license server.
    #[error("network error: {0}")]
    Network(String),

    /// The license server did not answer in time.
    #[error("license server request timed out")]
    Timeout,

    /// The server answered with a well-formed rejection.
    #[error(
        "rejected by license server (HTTP {status}): {}",
        .message.as_deref().unwrap_or("no reason given")
    )]
    ServerRejected {
        status: u16,
        message: Option<String>,
    },

    /// A server-issued token does not match the request it answers.
    #[error("integrity mismatch: {0}")]
    IntegrityMismatch(String),

    /// The server answered with a body we could not understand.
    #[error("invalid server response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LicenseError {
    /// Returns the flat category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Token(CryptoError::MalformedToken(_)) => ErrorKind::Decode,
            Self::Token(CryptoError::InvalidPayload(_)) => ErrorKind::Format,
            Self::Token(_) => ErrorKind::Crypto,
            Self::Identity(_) => ErrorKind::Identity,
            Self::Storage(_) => ErrorKind::Persistence,
            Self::Network(_) | Self::InvalidResponse(_) => ErrorKind::Transport,
            Self::Timeout => ErrorKind::Timeout,
            Self::ServerRejected { .. } => ErrorKind::ServerRejected,
            Self::IntegrityMismatch(_) => ErrorKind::IntegrityMismatch,
            Self::Config(_) => ErrorKind::Config,
            Self::Serialization(_) => ErrorKind::Format,
        }
    }

    /// Returns true if the license server could not be reached in time.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Timeout)
    }
}

impl From<reqwest::Error> for LicenseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Flat error taxonomy carried by operation outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Token shape is wrong (missing separator).
    Decode,
    /// Authentication tag failure, foreign key or bad base64.
    Crypto,
    /// Decrypted bytes are not a valid payload.
    Format,
    /// Device id unavailable.
    Identity,
    /// File I/O failed.
    Persistence,
    /// Server unreachable.
    Transport,
    /// Server too slow.
    Timeout,
    /// Server answered with a failure.
    ServerRejected,
    /// Server token does not match the request.
    IntegrityMismatch,
    /// Configuration is unusable.
    Config,
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
