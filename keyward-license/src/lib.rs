//! Licensing and activation for Keyward.
//!
//! This crate handles:
//! - Activation of a device with a license key through the license server
//! - Local validation of the stored, encrypted activation token
//! - Best-effort remote confirmation that never locks out an offline user
//! - Deactivation, confirmed by the server before the local token is removed
//! - A time-bounded or unlimited trial when no license is present
//!
//! # Components
//!
//! - **Device**: stable per-machine id ([`MachineIdentity`])
//! - **State**: the single [`LicenseStatus`] record, versioned and owned by
//!   the engine ([`LicenseState`])
//! - **Store**: activation token and trial start files ([`FileStore`])
//! - **Trial**: trial window evaluation ([`TrialManager`])
//! - **Engine**: local/remote activate, validate, deactivate
//!   ([`ActivationEngine`])
//! - **Manager**: the facade used by UIs ([`LicenseManager`])
//!
//! # Token Format
//!
//! Activation tokens are `base64(iv):base64(ciphertext)` sealed with
//! AES-256-GCM under a key shared with the license server, see
//! [`keyward_crypto`]. They decrypt to a JSON [`ActivationPayload`].

pub mod catalog;
mod client;
mod config;
mod device;
mod engine;
mod error;
mod manager;
mod outcome;
mod payload;
mod state;
mod status;
mod store;
mod trial;

pub use client::LicenseClient;
pub use config::{LicenseConfig, TrialConfig, DEFAULT_CRYPTO_KEY, DEFAULT_PRODUCT_ID};
pub use device::{
    hash_machine_id, DeviceIdentity, FixedIdentity, MachineIdentity, WILDCARD_DEVICE_ID,
};
pub use engine::{
    ActivationEngine, MSG_ACTIVATION_FAILED, MSG_ACTIVATION_SUCCESSFUL,
    MSG_DEACTIVATION_FAILED, MSG_DEACTIVATION_SUCCESSFUL, MSG_DEVICE_MISMATCH,
    MSG_INVALID_ACTIVATION_CODE, MSG_LICENSE_ACTIVATED, MSG_LOCAL_ACTIVATED,
    MSG_LOCAL_DEACTIVATED, MSG_LOCAL_NOT_ACTIVATED, MSG_NOT_PERSISTED, MSG_PRODUCT_MISMATCH,
    MSG_REMOTE_ACTIVATED, MSG_REMOTE_NOT_ACTIVATED, MSG_REMOTE_OFFLINE,
};
pub use error::{ErrorKind, LicenseError, LicenseResult};
pub use manager::{LicenseManager, LicenseUi, TracingUi};
pub use outcome::Outcome;
pub use payload::{ActivationPayload, BindingCheck, ValidationPayload};
pub use state::{LicenseState, StateSnapshot};
pub use status::{LicenseStatus, UNLIMITED_TRIAL_DAYS};
pub use store::FileStore;
pub use trial::{TrialCheck, TrialManager, TrialState, DAY_MS};
