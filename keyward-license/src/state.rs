//! Versioned license state cell.
//!
//! The activation engine owns the only writer. Everyone else reads cloned
//! snapshots or follows updates through a `watch` receiver. Every update
//! replaces the whole record and bumps the version, so a reader never sees a
//! record that is half old and half new.

use crate::status::LicenseStatus;
use serde::Serialize;
use tokio::sync::watch;

/// A license status together with its replacement count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    pub version: u64,
    pub status: LicenseStatus,
}

/// Holder of the current license status.
#[derive(Debug)]
pub struct LicenseState {
    tx: watch::Sender<StateSnapshot>,
}

impl LicenseState {
    /// Creates a cell holding the deactivated snapshot at version 0.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StateSnapshot {
            version: 0,
            status: LicenseStatus::deactivated(),
        });
        Self { tx }
    }

    /// Returns a copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        self.tx.borrow().clone()
    }

    /// Returns a copy of the current status.
    #[must_use]
    pub fn status(&self) -> LicenseStatus {
        self.tx.borrow().status.clone()
    }

    /// Returns a receiver notified on every replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.tx.subscribe()
    }

    /// Swaps in a new status and returns the new version.
    pub(crate) fn replace(&self, status: LicenseStatus) -> u64 {
        let mut version = 0;
        self.tx.send_modify(|snapshot| {
            snapshot.version += 1;
            snapshot.status = status;
            version = snapshot.version;
        });
        version
    }

    /// Edits the current status in place and returns the new version.
    ///
    /// `f` sees whatever record is current at the time of the swap, so
    /// changes made by other operations while the caller was awaiting I/O
    /// are kept.
    pub(crate) fn update(&self, f: impl FnOnce(&mut LicenseStatus)) -> u64 {
        let mut version = 0;
        self.tx.send_modify(|snapshot| {
            f(&mut snapshot.status);
            snapshot.version += 1;
            version = snapshot.version;
        });
        version
    }

    /// Swaps in `status` only if the state is still at version `seen`.
    /// Returns false, leaving the newer record alone, otherwise.
    pub(crate) fn replace_if_unchanged(&self, seen: u64, status: LicenseStatus) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.version != seen {
                return false;
            }
            snapshot.version += 1;
            snapshot.status = status;
            true
        })
    }
}

impl Default for LicenseState {
    fn default() -> Self {
        Self::new()
    }
}
