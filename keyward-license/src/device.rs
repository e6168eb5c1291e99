//! Device identity for license binding.
//!
//! Produces a stable identifier for this machine. Activation tokens bound to
//! a device carry this id; tokens carrying [`WILDCARD_DEVICE_ID`] are valid on
//! any machine.

use crate::error::{LicenseError, LicenseResult};
use sha2::{Digest, Sha256};

/// Device id of activations not bound to a single machine.
pub const WILDCARD_DEVICE_ID: &str = "*";

/// Source of the current device id.
pub trait DeviceIdentity: Send + Sync {
    /// Returns the id of the device this process runs on.
    fn device_id(&self) -> LicenseResult<String>;
}

/// Derives the device id from the platform machine id.
///
/// The id is the hex SHA-256 of the OS-provided machine identifier, so it
/// survives restarts and reinstalls of the application but differs between
/// machines.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachineIdentity;

impl DeviceIdentity for MachineIdentity {
    fn device_id(&self) -> LicenseResult<String> {
        let raw = get_machine_id().ok_or_else(|| {
            LicenseError::Identity(format!(
                "machine id unavailable on {}",
                std::env::consts::OS
            ))
        })?;
        Ok(hash_machine_id(&raw))
    }
}

/// A constant device id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIdentity(pub String);

impl FixedIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl DeviceIdentity for FixedIdentity {
    fn device_id(&self) -> LicenseResult<String> {
        Ok(self.0.clone())
    }
}

/// Hashes a raw machine identifier into a device id.
#[must_use]
pub fn hash_machine_id(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Gets the machine ID (platform-specific unique identifier).
fn get_machine_id() -> Option<String> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("IOPlatformUUID"))
                    .and_then(|l| l.split('"').nth(3))
                    .map(String::from)
            })
    }

    #[cfg(target_os = "linux")]
    {
        // Try /etc/machine-id first, then /var/lib/dbus/machine-id
        std::fs::read_to_string("/etc/machine-id")
            .or_else(|_| std::fs::read_to_string("/var/lib/dbus/machine-id"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("reg")
            .args([
                "query",
                r"HKEY_LOCAL_MACHINE\SOFTWARE\Microsoft\Cryptography",
                "/v",
                "MachineGuid",
            ])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("MachineGuid"))
                    .and_then(|l| l.split_whitespace().last())
                    .map(String::from)
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_hex_sha256() {
        let id = hash_machine_id("abc");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_ignores_surrounding_whitespace() {
        assert_eq!(hash_machine_id("abc\n"), hash_machine_id("abc"));
    }

    #[test]
    fn different_machines_differ() {
        assert_ne!(hash_machine_id("machine-a"), hash_machine_id("machine-b"));
    }
}
