//! Activation token encryption for Keyward.
//!
//! Activation and validation tokens are issued by the license server and
//! carried by the client as opaque strings:
//!
//! ```text
//! base64(iv) ":" base64(ciphertext || tag)
//! ```
//!
//! The cipher is AES-256-GCM with a fresh 96-bit nonce per token. Decryption
//! always verifies the authentication tag; a token that fails the check is
//! rejected, there is no unauthenticated fallback.
//!
//! # Security caveat
//!
//! The key is a single pre-shared secret compiled into every client and known
//! to the issuing server. Anyone holding a client binary can recover it and
//! decrypt or forge tokens offline. Tokens therefore prove integrity against
//! accidental corruption and casual tampering only, not against a determined
//! holder of the binary.
//!
//! # Example
//!
//! ```
//! use keyward_crypto::{decode, encode, SharedKey};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Grant {
//!     product: String,
//! }
//!
//! let key = SharedKey::generate();
//! let token = encode(&key, &Grant { product: "APP.V1".into() }).unwrap();
//! let grant: Grant = decode(&key, &token).unwrap();
//! assert_eq!(grant.product, "APP.V1");
//! ```

mod error;
mod key;
mod token;

pub use error::{CryptoError, CryptoResult};
pub use key::{SharedKey, KEY_SIZE};
pub use token::{decode, encode, open, seal, SealedToken, NONCE_SIZE, SEPARATOR, TAG_SIZE};
