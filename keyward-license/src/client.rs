//! License server API client.
//!
//! JSON over HTTPS. Every request is bounded by the client timeouts; an
//! expired timeout surfaces as [`LicenseError::Timeout`].

use crate::config::LicenseConfig;
use crate::error::{LicenseError, LicenseResult};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct ActivateRequest<'a> {
    device_id: &'a str,
    license_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct ActivateResponse {
    #[serde(default)]
    success: bool,
    activation_code: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    activation_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    #[serde(default)]
    success: bool,
    validation_code: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct DeactivateRequest<'a> {
    device_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct DeactivateResponse {
    #[serde(default)]
    success: bool,
    error: Option<String>,
}

/// License server API client.
#[derive(Debug, Clone)]
pub struct LicenseClient {
    base_url: String,
    client: Client,
}

impl LicenseClient {
    /// Creates a client for `base_url` with the given timeouts.
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> LicenseResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| LicenseError::Config(format!("failed to create HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    /// Creates a client from the server settings in `config`.
    pub fn from_config(config: &LicenseConfig) -> LicenseResult<Self> {
        Self::new(
            config.server_base(),
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    /// Returns the server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests an activation code binding `license_key` to `device_id`.
    pub async fn activate(&self, device_id: &str, license_key: &str) -> LicenseResult<String> {
        info!(
            key_prefix = %key_prefix(license_key),
            "Requesting activation"
        );
        let response = self
            .client
            .post(self.url("activate"))
            .json(&ActivateRequest {
                device_id,
                license_key,
            })
            .send()
            .await?;

        let status = response.status();
        let body: ActivateResponse = parse_body(response).await?;
        if !status.is_success() || !body.success {
            warn!(status = %status, "Activation rejected");
            let message = if body.success { None } else { body.error };
            return Err(rejected(status, message));
        }

        body.activation_code.ok_or_else(|| {
            LicenseError::InvalidResponse("activation response without activation_code".to_string())
        })
    }

    /// Asks the server which device the activation is bound to.
    /// Returns the encrypted validation code.
    pub async fn validate(&self, activation_code: &str) -> LicenseResult<String> {
        let response = self
            .client
            .post(self.url("validate"))
            .json(&ValidateRequest { activation_code })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status, None));
        }
        let body: ValidateResponse = parse_body(response).await?;
        if !body.success {
            return Err(rejected(status, body.error));
        }
        body.validation_code.ok_or_else(|| {
            LicenseError::InvalidResponse("validation response without validation_code".to_string())
        })
    }

    /// Releases the activation held by `device_id`.
    pub async fn deactivate(&self, device_id: &str) -> LicenseResult<()> {
        let response = self
            .client
            .post(self.url("deactivate"))
            .json(&DeactivateRequest { device_id })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status, None));
        }
        let body: DeactivateResponse = parse_body(response).await?;
        if !body.success {
            return Err(rejected(status, body.error));
        }
        Ok(())
    }

    /// Checks that the server is reachable.
    pub async fn ping(&self) -> LicenseResult<()> {
        let response = self.client.post(self.url("ping")).send().await?;
        let status = response.status();
        if status.is_success() {
            debug!("License server reachable");
            Ok(())
        } else {
            Err(rejected(status, None))
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}

async fn parse_body<T: DeserializeOwned>(response: Response) -> LicenseResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| LicenseError::InvalidResponse(e.to_string()))
}

/// First characters of a license key, safe to log.
pub(crate) fn key_prefix(license_key: &str) -> String {
    license_key.chars().take(8).collect()
}

fn rejected(status: StatusCode, message: Option<String>) -> LicenseError {
    LicenseError::ServerRejected {
        status: status.as_u16(),
        message: message.filter(|m| !m.is_empty()),
    }
}
