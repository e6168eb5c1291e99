//! Activation engine.
//!
//! Orchestrates local and remote activation, validation and deactivation,
//! and is the only writer of the license state. Every operation ends in an
//! [`Outcome`]; errors that an operation absorbs are logged and recorded in
//! `Outcome::error`.
//!
//! The two remote checks deliberately disagree on failure handling:
//! validation fails open (an unreachable server never locks out an activated
//! user) while deactivation fails closed (the server record must really be
//! released before we report success).

use crate::client::{key_prefix, LicenseClient};
use crate::config::LicenseConfig;
use crate::device::{DeviceIdentity, MachineIdentity, WILDCARD_DEVICE_ID};
use crate::error::{ErrorKind, LicenseError, LicenseResult};
use crate::outcome::Outcome;
use crate::payload::{ActivationPayload, BindingCheck, ValidationPayload};
use crate::state::{LicenseState, StateSnapshot};
use crate::status::LicenseStatus;
use crate::store::FileStore;
use crate::trial::{TrialManager, TrialState};
use chrono::Utc;
use keyward_crypto::SharedKey;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub const MSG_ACTIVATION_SUCCESSFUL: &str = "Activation successful";
pub const MSG_ACTIVATION_FAILED: &str = "Activation failed";
pub const MSG_INVALID_ACTIVATION_CODE: &str = "Invalid activation code";
pub const MSG_NOT_PERSISTED: &str = "license could not be saved and will not persist after restart";
pub const MSG_LOCAL_ACTIVATED: &str = "Local validation successful (activated)";
pub const MSG_LOCAL_NOT_ACTIVATED: &str = "Local validation successful (not activated)";
pub const MSG_PRODUCT_MISMATCH: &str = "Invalid activation code (product mismatch)";
pub const MSG_DEVICE_MISMATCH: &str = "Invalid activation code (device ID mismatch)";
pub const MSG_REMOTE_NOT_ACTIVATED: &str = "Validation successful (not activated)";
pub const MSG_REMOTE_ACTIVATED: &str = "Validation successful (activated)";
pub const MSG_REMOTE_OFFLINE: &str = "Validation successful (offline)";
pub const MSG_LICENSE_ACTIVATED: &str = "License activated";
pub const MSG_LOCAL_DEACTIVATED: &str = "Local deactivation successful";
pub const MSG_DEACTIVATION_SUCCESSFUL: &str = "Deactivation successful";
pub const MSG_DEACTIVATION_FAILED: &str = "Deactivation failed";

/// The activation engine.
pub struct ActivationEngine {
    config: LicenseConfig,
    key: SharedKey,
    store: FileStore,
    client: LicenseClient,
    device: Arc<dyn DeviceIdentity>,
    trial: TrialManager,
    state: LicenseState,
}

impl ActivationEngine {
    /// Creates an engine from its collaborators.
    pub fn new(
        config: LicenseConfig,
        store: FileStore,
        client: LicenseClient,
        device: Arc<dyn DeviceIdentity>,
    ) -> LicenseResult<Self> {
        let key = config.shared_key()?;
        let trial = TrialManager::new(config.trial.clone());
        Ok(Self {
            config,
            key,
            store,
            client,
            device,
            trial,
            state: LicenseState::new(),
        })
    }

    /// Creates an engine bound to this machine, the configured data
    /// directory and the configured license server.
    pub fn from_config(config: LicenseConfig) -> LicenseResult<Self> {
        let store = FileStore::from_config(&config)?;
        let client = LicenseClient::from_config(&config)?;
        Self::new(config, store, client, Arc::new(MachineIdentity))
    }

    #[must_use]
    pub fn config(&self) -> &LicenseConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Returns a copy of the current status.
    #[must_use]
    pub fn status(&self) -> LicenseStatus {
        self.state.status()
    }

    /// Returns the current status with its version.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Follows state replacements.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state.subscribe()
    }

    /// Returns the id of this device.
    pub fn device_id(&self) -> LicenseResult<String> {
        self.device.device_id()
    }

    /// Activates from an activation token without contacting the server.
    ///
    /// Returns `Err` if the token cannot be decoded. Failing to save the
    /// token does not abort the activation; the outcome message says the
    /// activation will not survive a restart.
    pub async fn local_activate(&self, token: &str) -> LicenseResult<Outcome> {
        let token = token.trim();
        let payload = ActivationPayload::decode(&self.key, token)?;
        Ok(self.apply_activation(payload, token).await)
    }

    /// Activates this device with a license key through the server.
    pub async fn remote_activate(&self, license_key: &str) -> Outcome {
        let license_key = license_key.trim();
        let device_id = match self.device.device_id() {
            Ok(id) => id,
            Err(e) => {
                error!("Remote activation failed: {}", e);
                return Outcome::failure(MSG_ACTIVATION_FAILED).with_error(e.kind());
            }
        };

        let activation_code = match self.client.activate(&device_id, license_key).await {
            Ok(code) => code,
            Err(LicenseError::ServerRejected { status, message }) => {
                warn!(status, "Activation rejected by server");
                let message = message.unwrap_or_else(|| MSG_ACTIVATION_FAILED.to_string());
                return Outcome::failure(message).with_error(ErrorKind::ServerRejected);
            }
            Err(e) => {
                error!("Remote activation failed: {}", e);
                return Outcome::failure(MSG_ACTIVATION_FAILED).with_error(e.kind());
            }
        };

        let payload = match ActivationPayload::decode(&self.key, &activation_code) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Server issued an undecodable activation code: {}", e);
                return Outcome::failure(MSG_ACTIVATION_FAILED).with_error(e.kind());
            }
        };

        if payload.device_id != device_id || payload.license_key != license_key {
            let err = LicenseError::IntegrityMismatch(format!(
                "activation code issued for device {} and key {}",
                payload.device_id,
                key_prefix(&payload.license_key)
            ));
            warn!("{}", err);
            return Outcome::failure(MSG_INVALID_ACTIVATION_CODE).with_error(err.kind());
        }

        self.apply_activation(payload, &activation_code).await
    }

    /// Loads the stored activation token into the state.
    ///
    /// A missing or unreadable token means "not activated" and still
    /// succeeds. Product and device mismatches are always computed but only
    /// acted on when `enforce_binding` is configured.
    pub async fn local_validate(&self) -> Outcome {
        let seen = self.state.snapshot().version;
        let token = match self.store.read_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No activation token stored");
                self.clear_activation(seen);
                return Outcome::success(MSG_LOCAL_NOT_ACTIVATED);
            }
            Err(e) => {
                warn!("Failed to read activation token: {}", e);
                self.clear_activation(seen);
                return Outcome::success(MSG_LOCAL_NOT_ACTIVATED).with_error(e.kind());
            }
        };

        let payload = match ActivationPayload::decode(&self.key, &token) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Stored activation token is invalid: {}", e);
                self.clear_activation(seen);
                return Outcome::success(MSG_LOCAL_NOT_ACTIVATED).with_error(e.kind());
            }
        };

        let check = self.binding_check(&payload);
        if !check.product_matches {
            warn!(
                product = %payload.product,
                expected = %self.config.product_id,
                "Activation token names another product"
            );
            if self.config.enforce_binding {
                self.local_deactivate().await;
                return Outcome::failure(MSG_PRODUCT_MISMATCH)
                    .with_error(ErrorKind::IntegrityMismatch);
            }
        }
        if !check.device_matches {
            warn!(device_id = %payload.device_id, "Activation token is bound to another device");
            if self.config.enforce_binding {
                self.local_deactivate().await;
                return Outcome::failure(MSG_DEVICE_MISMATCH)
                    .with_error(ErrorKind::IntegrityMismatch);
            }
        }

        let status = LicenseStatus::activated(payload, &token, &self.config.product_names);
        if self.state.replace_if_unchanged(seen, status) {
            info!("Activation loaded from local token");
        } else {
            debug!("License state changed while validating, keeping the newer record");
        }
        Outcome::success(MSG_LOCAL_ACTIVATED)
    }

    /// Computes whether `payload` applies to this build and this device.
    #[must_use]
    pub fn binding_check(&self, payload: &ActivationPayload) -> BindingCheck {
        let current = if payload.is_wildcard() {
            None
        } else {
            match self.device.device_id() {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Cannot compare device binding: {}", e);
                    None
                }
            }
        };
        BindingCheck::evaluate(payload, &self.config.product_id, current.as_deref())
    }

    /// Confirms the activation with the server.
    ///
    /// Never fails and never changes the state: every problem reaching or
    /// believing the server is reported as an offline success.
    pub async fn remote_validate(&self) -> Outcome {
        let status = self.state.status();
        if !status.activated {
            return Outcome::success(MSG_REMOTE_NOT_ACTIVATED);
        }

        let bound_device = status.device_id.unwrap_or_default();
        if bound_device == WILDCARD_DEVICE_ID {
            return match self.client.ping().await {
                Ok(()) => Outcome::success(MSG_LICENSE_ACTIVATED),
                Err(e) => offline(&e),
            };
        }

        let Some(activation_code) = status.activation_code else {
            warn!("Activated status without an activation code");
            return Outcome::success(MSG_REMOTE_OFFLINE).with_error(ErrorKind::Format);
        };

        let confirmed = match self.client.validate(&activation_code).await {
            Ok(code) => ValidationPayload::decode(&self.key, &code),
            Err(e) => Err(e),
        };
        match confirmed {
            Ok(validation) if validation.device_id == bound_device => {
                Outcome::success(MSG_REMOTE_ACTIVATED)
            }
            Ok(validation) => offline(&LicenseError::IntegrityMismatch(format!(
                "server reports binding to device {}",
                validation.device_id
            ))),
            Err(e) => offline(&e),
        }
    }

    /// Local then remote validation.
    ///
    /// When no activation is found the trial is re-evaluated, so callers
    /// see up-to-date trial flags.
    pub async fn validate(&self) -> Outcome {
        let local = self.local_validate().await;
        if !local.success {
            return local;
        }
        if !self.state.status().activated {
            self.check_trial_mode().await;
        }
        self.remote_validate().await
    }

    /// Removes the stored token, resets the state and re-checks the trial.
    ///
    /// Idempotent; the state is replaced once with the deactivated snapshot
    /// already carrying the fresh trial result.
    pub async fn local_deactivate(&self) -> Outcome {
        let mut outcome = Outcome::success(MSG_LOCAL_DEACTIVATED);
        if let Err(e) = self.store.delete_token().await {
            error!("Failed to delete activation token: {}", e);
            outcome = outcome.with_error(e.kind());
        }

        let check = self
            .trial
            .check(&self.store, &LicenseStatus::deactivated(), Utc::now())
            .await;
        self.state.replace(check.status);
        info!(trial = ?check.state, "License deactivated locally");

        match (outcome.error, check.error) {
            (None, Some(kind)) => outcome.with_error(kind),
            _ => outcome,
        }
    }

    /// Releases this device's activation on the server.
    pub async fn remote_deactivate(&self) -> Outcome {
        let device_id = match self.device.device_id() {
            Ok(id) => id,
            Err(e) => {
                error!("Remote deactivation failed: {}", e);
                return Outcome::failure(MSG_DEACTIVATION_FAILED).with_error(e.kind());
            }
        };

        match self.client.deactivate(&device_id).await {
            Ok(()) => {
                info!("Activation released by server");
                Outcome::success(MSG_DEACTIVATION_SUCCESSFUL)
            }
            Err(e) => {
                error!("Remote deactivation failed: {}", e);
                Outcome::failure(MSG_DEACTIVATION_FAILED).with_error(e.kind())
            }
        }
    }

    /// Re-evaluates the trial and writes the result into the current status.
    ///
    /// Only the trial flags are touched, so an activation that lands while
    /// the trial record is being read survives.
    pub async fn check_trial_mode(&self) -> Outcome {
        let check = self
            .trial
            .check(&self.store, &self.state.status(), Utc::now())
            .await;
        self.state.update(|status| check.state.apply(status));

        let message = match check.state {
            TrialState::Disabled => "Trial mode disabled".to_string(),
            TrialState::Unknown => "Trial not started".to_string(),
            TrialState::Active { days_left } => format!("Trial active ({days_left} days left)"),
            TrialState::Expired => "Trial expired".to_string(),
            TrialState::Unlimited => "Trial active (unlimited)".to_string(),
        };
        let outcome = Outcome::success(message);
        match check.error {
            Some(kind) => outcome.with_error(kind),
            None => outcome,
        }
    }

    async fn apply_activation(&self, payload: ActivationPayload, token: &str) -> Outcome {
        let mut outcome = Outcome::success(MSG_ACTIVATION_SUCCESSFUL);
        if let Err(e) = self.store.write_token(token).await {
            error!("Failed to save activation token: {}", e);
            outcome = Outcome::success(format!("{MSG_ACTIVATION_SUCCESSFUL} ({MSG_NOT_PERSISTED})"))
                .with_error(e.kind());
        }

        info!(
            product = %payload.product,
            key_prefix = %key_prefix(&payload.license_key),
            "License activated"
        );
        self.state.replace(LicenseStatus::activated(
            payload,
            token,
            &self.config.product_names,
        ));
        outcome
    }

    /// Resets an activated state, unless it changed since version `seen`.
    fn clear_activation(&self, seen: u64) {
        if self.state.status().activated
            && !self.state.replace_if_unchanged(seen, LicenseStatus::deactivated())
        {
            debug!("License state changed while validating, keeping the newer record");
        }
    }
}

fn offline(err: &LicenseError) -> Outcome {
    warn!("License server check failed, continuing offline: {}", err);
    Outcome::success(MSG_REMOTE_OFFLINE).with_error(err.kind())
}
