//! Client configuration.
//!
//! Every field has a default matching the shipped client, so a config file
//! only needs to name what it overrides.

use crate::error::{LicenseError, LicenseResult};
use keyward_crypto::SharedKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Product identifier compiled into this build.
pub const DEFAULT_PRODUCT_ID: &str = "KEYWARD.V1";

/// Pre-shared token key compiled into this build.
pub const DEFAULT_CRYPTO_KEY: &str = "GcjjXvlOXBI64iQZFbuGTkLbT56YcpaBDpvJ+2sXtsk=";

/// Trial mode configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Whether trial mode is offered at all.
    pub enabled: bool,
    /// Trial length in days; negative means unlimited.
    pub days: i64,
}

impl TrialConfig {
    /// Returns true if the trial never expires.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.days < 0
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            days: -1,
        }
    }
}

/// Licensing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Product identifier that activation tokens must name.
    pub product_id: String,
    /// Base URL of the license server (e.g. `https://license.example.com`).
    pub server_url: String,
    /// Base64 encoded 256-bit token key shared with the license server.
    pub crypto_key: String,
    /// Directory holding the activation and trial files.
    /// Defaults to `<platform data dir>/keyward`.
    pub data_dir: Option<PathBuf>,
    /// File name of the stored activation token.
    pub license_file: String,
    /// File name of the trial start timestamp.
    pub trial_file: String,
    /// Trial mode settings.
    pub trial: TrialConfig,
    /// Upper bound for a whole license server request.
    pub request_timeout_secs: u64,
    /// Upper bound for establishing a connection to the license server.
    pub connect_timeout_secs: u64,
    /// Deactivate when a stored token names another product or device.
    pub enforce_binding: bool,
    /// Display names keyed by product id.
    pub product_names: BTreeMap<String, String>,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            server_url: "https://license.keyward.dev".to_string(),
            crypto_key: DEFAULT_CRYPTO_KEY.to_string(),
            data_dir: None,
            license_file: "activation.key".to_string(),
            trial_file: "trial.stamp".to_string(),
            trial: TrialConfig::default(),
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
            enforce_binding: false,
            product_names: BTreeMap::from([(
                DEFAULT_PRODUCT_ID.to_string(),
                "Keyward V1".to_string(),
            )]),
        }
    }
}

impl LicenseConfig {
    /// Loads a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> LicenseResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LicenseError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| LicenseError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Returns the data directory, falling back to the platform default.
    pub fn resolve_data_dir(&self) -> LicenseResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join("keyward"))
            .ok_or_else(|| LicenseError::Config("no platform data directory".to_string()))
    }

    /// Parses the configured token key.
    pub fn shared_key(&self) -> LicenseResult<SharedKey> {
        SharedKey::from_base64(&self.crypto_key)
            .map_err(|e| LicenseError::Config(format!("crypto_key: {e}")))
    }

    /// Returns the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the connect timeout as a `Duration`.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the server base URL without a trailing slash.
    #[must_use]
    pub fn server_base(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }
}
