//! Decrypted token payloads.

use crate::device::WILDCARD_DEVICE_ID;
use crate::error::LicenseResult;
use keyward_crypto::SharedKey;
use serde::{Deserialize, Serialize};

/// The contents of an activation token (matches server JSON structure).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationPayload {
    /// Licensee name.
    #[serde(default)]
    pub name: Option<String>,
    /// Product identifier.
    pub product: String,
    /// Edition code (e.g. `PRO`).
    #[serde(default)]
    pub edition: Option<String>,
    /// Bound device id, or `*` for an unbound activation.
    pub device_id: String,
    /// The license key this activation was issued for.
    pub license_key: String,
}

impl ActivationPayload {
    /// Decrypts and parses an activation token.
    pub fn decode(key: &SharedKey, token: &str) -> LicenseResult<Self> {
        Ok(keyward_crypto::decode(key, token)?)
    }

    /// Returns true if the activation is not bound to one machine.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.device_id == WILDCARD_DEVICE_ID
    }
}

/// The contents of a validation token: the device a license is bound to.
///
/// The server encrypts the bare device id, not a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPayload {
    pub device_id: String,
}

impl ValidationPayload {
    /// Decrypts a validation token.
    pub fn decode(key: &SharedKey, token: &str) -> LicenseResult<Self> {
        let device_id = keyward_crypto::open(key, token)?;
        Ok(Self { device_id })
    }
}

/// Whether a stored activation applies to this build and this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingCheck {
    pub product_matches: bool,
    pub device_matches: bool,
}

impl BindingCheck {
    /// Compares a payload against the build's product id and the current
    /// device id. A wildcard payload matches every device; when the current
    /// device id is unknown only a wildcard matches.
    #[must_use]
    pub fn evaluate(
        payload: &ActivationPayload,
        product_id: &str,
        current_device_id: Option<&str>,
    ) -> Self {
        let device_matches = payload.is_wildcard()
            || current_device_id.is_some_and(|id| id == payload.device_id);
        Self {
            product_matches: payload.product == product_id,
            device_matches,
        }
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.product_matches && self.device_matches
    }
}
