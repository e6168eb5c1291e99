//! Command line surface of the `keyward` binary.
//!
//! Argument parsing and config resolution live here so they can be tested
//! without spawning the binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keyward_license::{LicenseConfig, LicenseStatus, Outcome};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "keyward")]
#[command(about = "Activate, validate and deactivate Keyward licenses")]
#[command(version)]
pub struct Args {
    /// Path to a JSON license config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// License server base URL
    #[arg(long, global = true, env = "KEYWARD_SERVER_URL")]
    pub server_url: Option<String>,

    /// Directory holding the activation and trial files
    #[arg(long, global = true, env = "KEYWARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Use this device id instead of the machine id
    #[arg(long, global = true)]
    pub device_id: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate the stored activation locally and print the status
    Status,
    /// Activate this device with a license key
    Activate {
        /// License key issued to the customer
        key: String,
    },
    /// Release this device's activation
    Deactivate,
    /// Validate locally, then confirm with the license server
    Validate,
    /// Print this device's id
    DeviceId,
    /// Re-evaluate trial mode
    Trial,
}

impl Args {
    /// Loads the config file, if any, and applies command line overrides.
    pub fn resolve_config(&self) -> Result<LicenseConfig> {
        let mut config = match &self.config {
            Some(path) => LicenseConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => LicenseConfig::default(),
        };
        if let Some(url) = &self.server_url {
            config.server_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

/// JSON document printed for every command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub status: LicenseStatus,
}

impl Report {
    pub fn new(outcome: Option<Outcome>, status: LicenseStatus) -> Self {
        Self { outcome, status }
    }

    /// False if the command's outcome failed.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.outcome.as_ref().is_none_or(|o| o.success)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("rendering report")
    }
}
