//! Keyward license client
//!
//! Drives activation, validation and deactivation from a terminal and prints
//! the outcome and resulting license status as JSON.
//!
//! Usage:
//!   keyward activate ABCD-EFGH-IJKL-MNOP
//!   keyward --verbose validate

use std::process::ExitCode;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use keyward_cli::{Args, Command, Report};
use keyward_license::{
    ActivationEngine, FileStore, FixedIdentity, LicenseClient, LicenseManager, MachineIdentity,
    TracingUi,
};
use tracing::{debug, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = args.resolve_config()?;
    debug!(server = %config.server_base(), "Using license server");

    let store = FileStore::from_config(&config).context("resolving data directory")?;
    let client = LicenseClient::from_config(&config).context("building HTTP client")?;
    let engine = match &args.device_id {
        Some(id) => ActivationEngine::new(config, store, client, Arc::new(FixedIdentity::new(id))),
        None => ActivationEngine::new(config, store, client, Arc::new(MachineIdentity)),
    }
    .context("initializing license engine")?;
    let manager = LicenseManager::new(engine, Arc::new(TracingUi));

    let report = match &args.command {
        Command::Status => {
            manager.engine().local_validate().await;
            if !manager.status().activated {
                manager.engine().check_trial_mode().await;
            }
            Report::new(None, manager.fetch_status())
        }
        Command::Activate { key } => {
            let outcome = manager.activate(key).await;
            Report::new(Some(outcome), manager.status())
        }
        Command::Deactivate => {
            let outcome = manager.deactivate().await;
            Report::new(Some(outcome), manager.status())
        }
        Command::Validate => {
            let outcome = manager.validate().await;
            Report::new(Some(outcome), manager.fetch_status())
        }
        Command::DeviceId => {
            let Some(id) = manager.device_id() else {
                anyhow::bail!("device id unavailable on this machine");
            };
            println!("{id}");
            return Ok(ExitCode::SUCCESS);
        }
        Command::Trial => {
            let outcome = manager.engine().check_trial_mode().await;
            info!(message = %outcome.message, "Trial checked");
            Report::new(Some(outcome), manager.fetch_status())
        }
    };

    println!("{}", report.to_json()?);
    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
