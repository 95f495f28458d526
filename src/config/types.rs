//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::format::NumberLocale;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Log filter directive (trace, debug, info, warn, error).
    pub log_level: String,
    /// BCP 47 tag of the display locale.
    pub locale: String,
    /// Timeout in seconds for each request to the license server or the
    /// remote database.
    pub request_timeout_secs: u64,
    /// Employee persistence.
    pub storage: StorageConfig,
    /// License authority.
    pub license: LicenseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
            locale: NumberLocale::VI_VN.tag.to_string(),
            request_timeout_secs: 10,
            storage: StorageConfig::default(),
            license: LicenseConfig::default(),
        }
    }
}

impl AppConfig {
    /// The configured display locale, falling back to `vi-VN` for unknown
    /// tags.
    pub fn number_locale(&self) -> NumberLocale {
        NumberLocale::from_tag(&self.locale).unwrap_or_default()
    }

    /// Per-request timeout for outgoing HTTP calls. Zero is raised to one
    /// second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Which [`EmployeeStore`](crate::repository::EmployeeStore) to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON files under `data_dir`.
    #[default]
    Local,
    /// A PostgREST-style remote database.
    Remote,
}

/// Employee persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Selected backend.
    pub backend: StorageBackend,
    /// Directory for the local backend and the license cache.
    pub data_dir: PathBuf,
    /// Base URL of the remote database.
    pub remote_url: Option<String>,
    /// API key of the remote database.
    pub remote_api_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            data_dir: PathBuf::from("./data"),
            remote_url: None,
            remote_api_key: None,
        }
    }
}

impl StorageConfig {
    /// The remote URL and API key, or [`EngineError::NotConfigured`] if
    /// either is missing.
    pub fn remote_settings(&self) -> EngineResult<(&str, &str)> {
        required_pair("Remote storage", &self.remote_url, &self.remote_api_key)
    }
}

/// License authority settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Base URL of the license service.
    pub server_url: Option<String>,
    /// API key sent with every validation request.
    pub api_key: Option<String>,
}

impl LicenseConfig {
    /// The server URL and API key, or [`EngineError::NotConfigured`] if
    /// either is missing.
    pub fn settings(&self) -> EngineResult<(&str, &str)> {
        required_pair("License server", &self.server_url, &self.api_key)
    }
}

fn required_pair<'a>(
    feature: &str,
    url: &'a Option<String>,
    key: &'a Option<String>,
) -> EngineResult<(&'a str, &'a str)> {
    let present = |value: &'a Option<String>| value.as_deref().filter(|v| !v.trim().is_empty());
    match (present(url), present(key)) {
        (Some(url), Some(key)) => Ok((url, key)),
        (None, _) => Err(EngineError::NotConfigured {
            feature: feature.to_string(),
            message: "missing URL".to_string(),
        }),
        (_, None) => Err(EngineError::NotConfigured {
            feature: feature.to_string(),
            message: "missing API key".to_string(),
        }),
    }
}
