//! Error types for token encryption.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while sealing or opening tokens.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The token does not have the `<iv>:<ciphertext>` shape.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Decryption failed (wrong key, tampered data or bad encoding).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Decrypted bytes are not the expected payload.
    #[error("invalid token payload: {0}")]
    InvalidPayload(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The key material could not be decoded.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}
