//! Trial window tracking.
//!
//! The first finite trial check records its own timestamp as the trial start;
//! that record is never rewritten. Every later check measures the remaining
//! whole days against it.

use crate::config::TrialConfig;
use crate::error::ErrorKind;
use crate::status::{LicenseStatus, UNLIMITED_TRIAL_DAYS};
use crate::store::FileStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Milliseconds per day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Where the trial stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TrialState {
    /// Trial mode is switched off.
    Disabled,
    /// No trial start has been recorded yet. A check starts the trial on
    /// the spot, so this only names the state a check leaves; it is never
    /// the result of one.
    Unknown,
    /// Inside the trial window.
    Active { days_left: i64 },
    /// The trial window has passed.
    Expired,
    /// The trial never ends.
    Unlimited,
}

impl TrialState {
    /// Computes the state of a finite trial of `days` days that started at
    /// `start_ms`, as seen at `now_ms`.
    #[must_use]
    pub fn evaluate(start_ms: i64, days: i64, now_ms: i64) -> Self {
        let end_ms = start_ms.saturating_add(days.saturating_mul(DAY_MS));
        let days_left = end_ms.saturating_sub(now_ms).div_euclid(DAY_MS);
        if days_left <= 0 {
            Self::Expired
        } else {
            Self::Active { days_left }
        }
    }

    /// The `trial_days_left` value reported for this state.
    #[must_use]
    pub fn days_left(&self) -> i64 {
        match self {
            Self::Unlimited => UNLIMITED_TRIAL_DAYS,
            Self::Active { days_left } => *days_left,
            Self::Disabled | Self::Unknown | Self::Expired => 0,
        }
    }

    /// Writes the trial flags of this state into `status`. Every other field
    /// is left as it is; a disabled trial changes nothing.
    pub fn apply(&self, status: &mut LicenseStatus) {
        if *self != Self::Disabled {
            status.trial = true;
            status.trial_days_left = self.days_left();
        }
    }
}

/// Result of a trial check: the new state and the status to swap in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialCheck {
    pub state: TrialState,
    pub status: LicenseStatus,
    /// Kind of a storage problem met while checking, if any.
    pub error: Option<ErrorKind>,
}

/// Evaluates trial eligibility.
#[derive(Debug, Clone)]
pub struct TrialManager {
    config: TrialConfig,
}

impl TrialManager {
    pub fn new(config: TrialConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Checks the trial against `current` and returns its replacement.
    ///
    /// When trial mode is on the returned status always has `trial = true`,
    /// whatever the activation flag says. An unlimited trial touches no
    /// files.
    pub async fn check(
        &self,
        store: &FileStore,
        current: &LicenseStatus,
        now: DateTime<Utc>,
    ) -> TrialCheck {
        if !self.config.enabled {
            return TrialCheck {
                state: TrialState::Disabled,
                status: current.clone(),
                error: None,
            };
        }

        let mut error = None;
        let state = if self.config.is_unlimited() {
            TrialState::Unlimited
        } else {
            let now_ms = now.timestamp_millis();
            match store.read_trial_start().await {
                Ok(Some(start_ms)) => TrialState::evaluate(start_ms, self.config.days, now_ms),
                Ok(None) => {
                    debug!(state = ?TrialState::Unknown, "No trial record, starting trial");
                    if let Err(e) = store.write_trial_start(now_ms).await {
                        warn!("Failed to record trial start: {}", e);
                        error = Some(e.kind());
                    }
                    TrialState::evaluate(now_ms, self.config.days, now_ms)
                }
                Err(e) => {
                    warn!("Unreadable trial record, treating trial as expired: {}", e);
                    error = Some(e.kind());
                    TrialState::Expired
                }
            }
        };

        info!(?state, "Trial checked");
        let mut status = current.clone();
        state.apply(&mut status);
        TrialCheck {
            state,
            status,
            error,
        }
    }
}
