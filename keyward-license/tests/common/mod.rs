//! Shared test helpers for license tests.

#![allow(dead_code)]

use keyward_crypto::{encode, seal, SharedKey};
use keyward_license::{
    ActivationEngine, ActivationPayload, FileStore, FixedIdentity, LicenseClient, LicenseConfig,
    TrialConfig,
};
use std::path::Path;
use std::sync::Arc;

pub const PRODUCT_ID: &str = "KEYWARD.V1";
pub const DEVICE_ID: &str = "device-0001";
pub const LICENSE_KEY: &str = "ABCD-EFGH-IJKL-MNOP";

/// Nothing listens on this port; connections are refused immediately.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

/// Returns a deterministic token key.
pub fn test_key() -> SharedKey {
    let mut bytes = [0u8; 32];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = i as u8 + 1;
    }
    SharedKey::from_bytes(bytes)
}

/// Config pointing at `dir` and `server_url`, trial mode off.
pub fn test_config(dir: &Path, server_url: &str) -> LicenseConfig {
    LicenseConfig {
        product_id: PRODUCT_ID.to_string(),
        server_url: server_url.to_string(),
        crypto_key: test_key().to_base64(),
        data_dir: Some(dir.to_path_buf()),
        trial: TrialConfig {
            enabled: false,
            days: -1,
        },
        request_timeout_secs: 2,
        connect_timeout_secs: 1,
        ..LicenseConfig::default()
    }
}

pub fn payload(device_id: &str) -> ActivationPayload {
    ActivationPayload {
        name: Some("Ada Lovelace".to_string()),
        product: PRODUCT_ID.to_string(),
        edition: Some("PRO".to_string()),
        device_id: device_id.to_string(),
        license_key: LICENSE_KEY.to_string(),
    }
}

/// Seals an activation payload with the test key.
pub fn make_token(payload: &ActivationPayload) -> String {
    encode(&test_key(), payload).unwrap()
}

/// Seals a validation code naming `device_id`.
pub fn make_validation_code(device_id: &str) -> String {
    seal(&test_key(), device_id.as_bytes()).unwrap()
}

/// Engine for `config` running as [`DEVICE_ID`].
pub fn engine_with(config: LicenseConfig) -> ActivationEngine {
    let store = FileStore::from_config(&config).unwrap();
    let client = LicenseClient::from_config(&config).unwrap();
    ActivationEngine::new(config, store, client, Arc::new(FixedIdentity::new(DEVICE_ID))).unwrap()
}

pub fn engine(dir: &Path, server_url: &str) -> ActivationEngine {
    engine_with(test_config(dir, server_url))
}
