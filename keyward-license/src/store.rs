//! On-disk persistence of the activation token and the trial start.
//!
//! Each record is a single small file in the application data directory:
//! the raw token string, and the trial start as decimal Unix milliseconds.

use crate::config::LicenseConfig;
use crate::error::{LicenseError, LicenseResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File-backed license storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    license_file: String,
    trial_file: String,
}

impl FileStore {
    /// Creates a store with the default file names.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let defaults = LicenseConfig::default();
        Self {
            dir: dir.into(),
            license_file: defaults.license_file,
            trial_file: defaults.trial_file,
        }
    }

    /// Creates a store for the directory and file names in `config`.
    pub fn from_config(config: &LicenseConfig) -> LicenseResult<Self> {
        Ok(Self {
            dir: config.resolve_data_dir()?,
            license_file: config.license_file.clone(),
            trial_file: config.trial_file.clone(),
        })
    }

    /// Returns the data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the activation token file.
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.dir.join(&self.license_file)
    }

    /// Path of the trial start file.
    #[must_use]
    pub fn trial_path(&self) -> PathBuf {
        self.dir.join(&self.trial_file)
    }

    /// Reads the stored activation token, if any.
    pub async fn read_token(&self) -> LicenseResult<Option<String>> {
        let path = self.token_path();
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &path, e)),
        }
    }

    /// Writes the activation token, creating the directory if needed.
    pub async fn write_token(&self, token: &str) -> LicenseResult<()> {
        let path = self.token_path();
        self.ensure_dir().await?;
        fs::write(&path, token)
            .await
            .map_err(|e| storage_error("write", &path, e))?;
        debug!("Wrote activation token to {}", path.display());
        Ok(())
    }

    /// Deletes the activation token. A missing file is not an error.
    pub async fn delete_token(&self) -> LicenseResult<()> {
        let path = self.token_path();
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted activation token {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("delete", &path, e)),
        }
    }

    /// Reads the trial start timestamp (Unix milliseconds), if recorded.
    pub async fn read_trial_start(&self) -> LicenseResult<Option<i64>> {
        let path = self.trial_path();
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read", &path, e)),
        };
        content.trim().parse::<i64>().map(Some).map_err(|e| {
            LicenseError::Storage(format!("corrupt trial record {}: {e}", path.display()))
        })
    }

    /// Records the trial start timestamp (Unix milliseconds).
    pub async fn write_trial_start(&self, started_at_ms: i64) -> LicenseResult<()> {
        let path = self.trial_path();
        self.ensure_dir().await?;
        fs::write(&path, started_at_ms.to_string())
            .await
            .map_err(|e| storage_error("write", &path, e))
    }

    async fn ensure_dir(&self) -> LicenseResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| storage_error("create", &self.dir, e))
    }
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> LicenseError {
    LicenseError::Storage(format!("cannot {action} {}: {err}", path.display()))
}
