use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::{LicenseAuthority, LicenseVerdict};

/// Upper bound on one validation round trip, connection included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct ValidateLicenseRequest<'a> {
    input_code: &'a str,
}

/// [`LicenseAuthority`] calling the `validate_license` remote procedure of
/// a PostgREST-style service.
#[derive(Debug, Clone)]
pub struct HttpLicenseAuthority {
    client: Client,
    server_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpLicenseAuthority {
    /// Creates an authority for the service at `server_url`.
    pub fn new(server_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url, api_key)
    }

    /// Creates an authority sharing an existing HTTP client.
    pub fn with_client(
        client: Client,
        server_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replaces the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The procedure endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/rpc/validate_license", self.server_url)
    }
}

#[async_trait]
impl LicenseAuthority for HttpLicenseAuthority {
    async fn check(&self, key: &str) -> EngineResult<LicenseVerdict> {
        let response = self
            .client
            .post(self.endpoint())
            .header("apikey", &self.api_key)
            .timeout(self.timeout)
            .json(&ValidateLicenseRequest { input_code: key })
            .send()
            .await
            .map_err(|err| EngineError::LicenseServer {
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::LicenseServer {
                message: format!("HTTP error: {}", status.as_u16()),
            });
        }

        let verdict = response
            .json::<LicenseVerdict>()
            .await
            .map_err(|err| EngineError::LicenseServer {
                message: format!("invalid response: {}", err),
            })?;
        debug!(valid = verdict.valid, "License authority answered");
        Ok(verdict)
    }
}
