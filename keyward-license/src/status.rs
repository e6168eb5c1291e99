//! The license status record.

use crate::catalog;
use crate::payload::ActivationPayload;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `trial_days_left` value meaning the trial never expires.
pub const UNLIMITED_TRIAL_DAYS: i64 = -1;

/// Snapshot of the current activation and trial status.
///
/// When `activated` is false every identity field is `None`.
/// `trial_days_left` is `-1` for an unlimited trial, `0` for an expired one,
/// and the remaining whole days otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStatus {
    pub activated: bool,
    pub name: Option<String>,
    pub product: Option<String>,
    pub edition: Option<String>,
    pub product_display_name: Option<String>,
    pub device_id: Option<String>,
    pub license_key: Option<String>,
    pub activation_code: Option<String>,
    pub trial: bool,
    pub trial_days_left: i64,
}

impl LicenseStatus {
    /// The canonical not-activated snapshot.
    #[must_use]
    pub fn deactivated() -> Self {
        Self {
            activated: false,
            name: None,
            product: None,
            edition: None,
            product_display_name: None,
            device_id: None,
            license_key: None,
            activation_code: None,
            trial: false,
            trial_days_left: 0,
        }
    }

    /// Builds the activated snapshot described by a decoded token.
    #[must_use]
    pub fn activated(
        payload: ActivationPayload,
        activation_code: &str,
        product_names: &BTreeMap<String, String>,
    ) -> Self {
        let product_display_name =
            catalog::display_name(product_names, &payload.product, payload.edition.as_deref());
        Self {
            activated: true,
            name: payload.name,
            product: Some(payload.product),
            edition: payload.edition,
            product_display_name: Some(product_display_name),
            device_id: Some(payload.device_id),
            license_key: Some(payload.license_key),
            activation_code: Some(activation_code.to_string()),
            trial: false,
            trial_days_left: 0,
        }
    }

    /// Returns true if the trial has run out.
    #[must_use]
    pub fn trial_expired(&self) -> bool {
        self.trial && self.trial_days_left == 0
    }

    /// Whether the product may be used: a paid activation always grants
    /// access, otherwise an unexpired trial does.
    #[must_use]
    pub fn has_access(&self) -> bool {
        self.activated || (self.trial && !self.trial_expired())
    }
}

impl Default for LicenseStatus {
    fn default() -> Self {
        Self::deactivated()
    }
}
