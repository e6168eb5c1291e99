//! Token sealing and opening using AES-256-GCM.
//!
//! A sealed token renders as `base64(nonce):base64(ciphertext)`, where the
//! ciphertext carries the 16-byte authentication tag at its end.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SharedKey;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Size of nonce in bytes (96 bits for AES-GCM).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Delimiter between the encoded nonce and the encoded ciphertext.
pub const SEPARATOR: char = ':';

/// A parsed token: nonce plus authenticated ciphertext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedToken {
    /// The nonce used for encryption (unique per token).
    pub nonce: [u8; NONCE_SIZE],
    /// The encrypted ciphertext (includes auth tag).
    pub ciphertext: Vec<u8>,
}

impl SealedToken {
    /// Decrypts the token with `key`.
    pub fn open(&self, key: &SharedKey) -> CryptoResult<Vec<u8>> {
        let cipher = Aes256Gcm::new(key.as_bytes().into());
        let nonce = Nonce::from_slice(&self.nonce);

        cipher
            .decrypt(nonce, self.ciphertext.as_ref())
            .map_err(|_| {
                CryptoError::Decryption(
                    "authentication failed (wrong key or tampered data)".to_string(),
                )
            })
    }
}

impl FromStr for SealedToken {
    type Err = CryptoError;

    fn from_str(token: &str) -> CryptoResult<Self> {
        let token = token.trim();
        let (nonce_b64, ciphertext_b64) = token.split_once(SEPARATOR).ok_or_else(|| {
            CryptoError::MalformedToken(format!("missing '{SEPARATOR}' separator"))
        })?;
        if ciphertext_b64.contains(SEPARATOR) {
            return Err(CryptoError::MalformedToken(format!(
                "expected exactly one '{SEPARATOR}' separator"
            )));
        }

        let nonce_bytes = STANDARD
            .decode(nonce_b64)
            .map_err(|e| CryptoError::Decryption(format!("invalid nonce base64: {e}")))?;
        if nonce_bytes.len() != NONCE_SIZE {
            return Err(CryptoError::Decryption(format!(
                "invalid nonce length: expected {NONCE_SIZE}, got {}",
                nonce_bytes.len()
            )));
        }

        let ciphertext = STANDARD
            .decode(ciphertext_b64)
            .map_err(|e| CryptoError::Decryption(format!("invalid ciphertext base64: {e}")))?;
        if ciphertext.len() < TAG_SIZE {
            return Err(CryptoError::Decryption("ciphertext too short".to_string()));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&nonce_bytes);
        Ok(Self { nonce, ciphertext })
    }
}

impl fmt::Display for SealedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}",
            STANDARD.encode(self.nonce),
            STANDARD.encode(&self.ciphertext)
        )
    }
}

/// Encrypts `plaintext` under a fresh random nonce and renders the token.
pub fn seal(key: &SharedKey, plaintext: &[u8]) -> CryptoResult<String> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(SealedToken {
        nonce: nonce_bytes,
        ciphertext,
    }
    .to_string())
}

/// Parses and decrypts a token into UTF-8 text.
pub fn open(key: &SharedKey, token: &str) -> CryptoResult<String> {
    let sealed: SealedToken = token.parse()?;
    let plaintext = sealed.open(key)?;
    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::InvalidPayload(format!("invalid UTF-8: {e}")))
}

/// Serializes `value` as JSON and seals it.
pub fn encode<T: Serialize>(key: &SharedKey, value: &T) -> CryptoResult<String> {
    let json = serde_json::to_vec(value)
        .map_err(|e| CryptoError::Encryption(format!("payload serialization: {e}")))?;
    seal(key, &json)
}

/// Opens a token and parses its plaintext as a JSON payload.
pub fn decode<T: DeserializeOwned>(key: &SharedKey, token: &str) -> CryptoResult<T> {
    let plaintext = open(key, token)?;
    serde_json::from_str(&plaintext).map_err(|e| CryptoError::InvalidPayload(e.to_string()))
}
