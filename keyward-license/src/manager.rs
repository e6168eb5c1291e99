//! Externally callable license operations.
//!
//! [`LicenseManager`] sequences the engine's operations the way a UI needs
//! them: it reports failures to a [`LicenseUi`], prompts for activation while
//! in trial mode, and broadcasts the status after every user action. None of
//! its operations returns an error or panics.

use crate::config::LicenseConfig;
use crate::engine::ActivationEngine;
use crate::error::LicenseResult;
use crate::outcome::Outcome;
use crate::status::LicenseStatus;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Capacity of the status event channel.
const STATUS_CHANNEL_CAPACITY: usize = 16;

/// The user-facing side of licensing.
pub trait LicenseUi: Send + Sync {
    /// Shows an error message to the user.
    fn notify_error(&self, message: &str);

    /// Asks the user to enter a license key.
    fn prompt_activation(&self);
}

/// A [`LicenseUi`] that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUi;

impl LicenseUi for TracingUi {
    fn notify_error(&self, message: &str) {
        warn!("{}", message);
    }

    fn prompt_activation(&self) {
        info!("Activation required");
    }
}

/// The license facade.
pub struct LicenseManager {
    engine: ActivationEngine,
    ui: Arc<dyn LicenseUi>,
    events: broadcast::Sender<LicenseStatus>,
}

impl LicenseManager {
    pub fn new(engine: ActivationEngine, ui: Arc<dyn LicenseUi>) -> Self {
        let (events, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self { engine, ui, events }
    }

    /// Builds the manager and its engine from `config`.
    pub fn from_config(config: LicenseConfig, ui: Arc<dyn LicenseUi>) -> LicenseResult<Self> {
        Ok(Self::new(ActivationEngine::from_config(config)?, ui))
    }

    #[must_use]
    pub fn engine(&self) -> &ActivationEngine {
        &self.engine
    }

    /// Receives every status emitted by [`Self::fetch_status`].
    #[must_use]
    pub fn subscribe_status(&self) -> broadcast::Receiver<LicenseStatus> {
        self.events.subscribe()
    }

    /// Returns the current status without emitting it.
    #[must_use]
    pub fn status(&self) -> LicenseStatus {
        self.engine.status()
    }

    /// Emits the current status to subscribers and returns it.
    pub fn fetch_status(&self) -> LicenseStatus {
        let status = self.engine.status();
        if self.events.send(status.clone()).is_err() {
            debug!("No status subscribers");
        }
        status
    }

    /// Activates this device with `license_key`.
    pub async fn activate(&self, license_key: &str) -> Outcome {
        let outcome = self.engine.remote_activate(license_key).await;
        if !outcome.success {
            self.ui.notify_error(&outcome.message);
        }
        self.fetch_status();
        outcome
    }

    /// Releases this device's activation on the server, then locally.
    ///
    /// The local token is only removed once the server confirmed the release.
    pub async fn deactivate(&self) -> Outcome {
        let outcome = self.engine.remote_deactivate().await;
        if outcome.success {
            let local = self.engine.local_deactivate().await;
            if let Some(kind) = local.error {
                warn!(?kind, "Local cleanup after deactivation was incomplete");
            }
        } else {
            self.ui.notify_error(&outcome.message);
        }
        self.fetch_status();
        outcome
    }

    /// Runs local then remote validation.
    pub async fn validate(&self) -> Outcome {
        self.engine.validate().await
    }

    /// Prompts for activation while in trial mode. Returns true if prompted.
    pub fn check_trial_mode(&self) -> bool {
        let trial = self.engine.status().trial;
        if trial {
            self.ui.prompt_activation();
        }
        trial
    }

    /// Returns this device's id, or `None` if it cannot be determined.
    #[must_use]
    pub fn device_id(&self) -> Option<String> {
        match self.engine.device_id() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Failed to get device id: {}", e);
                None
            }
        }
    }

    /// Startup sequence: emit, validate, prompt if in trial, emit again.
    pub async fn on_ready(&self) {
        self.fetch_status();

        let outcome = self.validate().await;
        if outcome.success {
            info!(message = %outcome.message, "License validated");
        } else {
            warn!(message = %outcome.message, "License validation failed");
            self.ui.notify_error(&outcome.message);
        }
        if let Some(kind) = outcome.error {
            debug!(?kind, "Validation absorbed an error");
        }

        self.check_trial_mode();
        self.fetch_status();
    }
}
