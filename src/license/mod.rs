//! License entitlement for the Salary Engine.
//!
//! The payment history view is reserved for licensed installations. An
//! [`EntitlementGate`] checks license keys against a [`LicenseAuthority`]
//! and caches the last valid key in a
//! [`KeyValueStore`](crate::storage::KeyValueStore), so a restart trusts
//! the cached key immediately and only revokes it if the authority later
//! answers that it is no longer valid.

mod gate;
mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

pub use gate::{
    EntitlementGate, LICENSE_KEY_KEY, LICENSE_STATUS_KEY, MSG_INVALID_KEY, MSG_NOT_CONFIGURED,
    MSG_UNREACHABLE,
};
pub use http::HttpLicenseAuthority;

/// The authority's answer for one license key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseVerdict {
    /// Whether the key is currently valid.
    pub valid: bool,
    /// Explanation supplied by the authority, possibly empty.
    #[serde(default)]
    pub message: String,
    /// Name of the licensed client, when valid.
    #[serde(default)]
    pub client_name: Option<String>,
}

/// Remote service that decides whether a license key is valid.
///
/// An `Err` means the authority could not be asked (network failure,
/// non-success status, malformed answer); a definite "no" is an `Ok`
/// verdict with `valid: false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LicenseAuthority: Send + Sync {
    /// Checks `key`.
    async fn check(&self, key: &str) -> EngineResult<LicenseVerdict>;
}

/// Snapshot of the gate's state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStatus {
    /// Whether the history view is unlocked.
    pub is_licensed: bool,
    /// The accepted (or restored) key.
    pub license_key: Option<String>,
    /// The licensed client's name, once the authority has reported it.
    pub client_name: Option<String>,
    /// The last validation error shown to the user.
    pub error: Option<String>,
}
