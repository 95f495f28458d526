use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::storage::KeyValueStore;

use super::{LicenseAuthority, LicenseStatus};

/// Cache key holding the last accepted license key.
pub const LICENSE_KEY_KEY: &str = "miniERP_license";
/// Cache key holding the status of the cached key.
pub const LICENSE_STATUS_KEY: &str = "miniERP_license_status";

const STATUS_VALID: &str = "valid";

/// Shown when no authority is configured.
pub const MSG_NOT_CONFIGURED: &str = "License server is not configured.";
/// Shown when the authority rejects a key without a message.
pub const MSG_INVALID_KEY: &str = "Invalid license key.";
/// Shown when the authority cannot be reached during validation.
pub const MSG_UNREACHABLE: &str = "Could not connect to the license server. Please try again.";

/// Decides whether the payment history view is unlocked.
pub struct EntitlementGate {
    authority: Option<Arc<dyn LicenseAuthority>>,
    cache: Arc<dyn KeyValueStore>,
    state: RwLock<LicenseStatus>,
    // Held across authority round-trips so results apply in call order.
    mutations: Mutex<()>,
}

impl EntitlementGate {
    /// Creates an unlicensed gate. Without an `authority` every validation
    /// fails with [`MSG_NOT_CONFIGURED`].
    pub fn new(authority: Option<Arc<dyn LicenseAuthority>>, cache: Arc<dyn KeyValueStore>) -> Self {
        Self {
            authority,
            cache,
            state: RwLock::new(LicenseStatus::default()),
            mutations: Mutex::new(()),
        }
    }

    /// Whether a license authority is available.
    pub fn is_configured(&self) -> bool {
        self.authority.is_some()
    }

    /// Trusts a cached valid key without asking the authority.
    ///
    /// Returns whether the gate is now licensed.
    pub async fn restore(&self) -> EngineResult<bool> {
        let _mutation = self.mutations.lock().await;
        let key = self.cache.get(LICENSE_KEY_KEY).await?;
        let status = self.cache.get(LICENSE_STATUS_KEY).await?;

        match key {
            Some(key) if !key.is_empty() && status.as_deref() == Some(STATUS_VALID) => {
                let mut state = self.state.write().await;
                state.is_licensed = true;
                state.license_key = Some(key);
                info!("Restored cached license");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Re-checks the current key with the authority.
    ///
    /// A definite rejection revokes the license and clears the cache; a
    /// transport failure keeps the cached trust.
    pub async fn revalidate(&self) -> EngineResult<()> {
        let _mutation = self.mutations.lock().await;
        let Some(authority) = &self.authority else {
            return Ok(());
        };
        let key = {
            let state = self.state.read().await;
            match (&state.license_key, state.is_licensed) {
                (Some(key), true) => key.clone(),
                _ => return Ok(()),
            }
        };

        match authority.check(&key).await {
            Ok(verdict) if verdict.valid => {
                self.state.write().await.client_name = verdict.client_name;
                info!("License revalidated");
                Ok(())
            }
            Ok(verdict) => {
                {
                    let mut state = self.state.write().await;
                    state.is_licensed = false;
                    state.error = Some(verdict.message);
                }
                warn!("Cached license was rejected, revoking");
                self.forget_cached().await
            }
            Err(err) => {
                warn!(error = %err, "License re-validation failed, using cached status");
                Ok(())
            }
        }
    }

    /// Runs [`revalidate`](Self::revalidate) on a background task.
    pub fn spawn_revalidation(self: &Arc<Self>) -> JoinHandle<()> {
        let gate = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = gate.revalidate().await {
                warn!(error = %err, "Background license re-validation failed");
            }
        })
    }

    /// Validates `key` with the authority and returns whether it was
    /// accepted. Failures are reported through [`LicenseStatus::error`].
    pub async fn validate(&self, key: &str) -> bool {
        let _mutation = self.mutations.lock().await;
        self.state.write().await.error = None;

        let Some(authority) = &self.authority else {
            self.reject(MSG_NOT_CONFIGURED.to_string()).await;
            return false;
        };

        let key = key.trim();
        if key.is_empty() {
            self.reject(MSG_INVALID_KEY.to_string()).await;
            return false;
        }

        match authority.check(key).await {
            Ok(verdict) if verdict.valid => {
                {
                    let mut state = self.state.write().await;
                    state.is_licensed = true;
                    state.license_key = Some(key.to_string());
                    state.client_name = verdict.client_name;
                }
                if let Err(err) = self.cache_key(key).await {
                    warn!(error = %err, "Failed to cache license key");
                }
                info!("License accepted");
                true
            }
            Ok(verdict) => {
                let message = if verdict.message.is_empty() {
                    MSG_INVALID_KEY.to_string()
                } else {
                    verdict.message
                };
                self.reject(message).await;
                false
            }
            Err(err) => {
                warn!(error = %err, "License server unreachable");
                self.reject(MSG_UNREACHABLE.to_string()).await;
                false
            }
        }
    }

    /// Forgets the key, client name and error, and clears the cache.
    pub async fn clear(&self) -> EngineResult<()> {
        let _mutation = self.mutations.lock().await;
        *self.state.write().await = LicenseStatus::default();
        info!("License cleared");
        self.forget_cached().await
    }

    /// Snapshot of the current state.
    pub async fn status(&self) -> LicenseStatus {
        self.state.read().await.clone()
    }

    /// Fails with [`EngineError::Unlicensed`] unless the gate is licensed.
    pub async fn ensure_licensed(&self) -> EngineResult<()> {
        if self.state.read().await.is_licensed {
            Ok(())
        } else {
            Err(EngineError::Unlicensed)
        }
    }

    async fn reject(&self, message: String) {
        let mut state = self.state.write().await;
        state.is_licensed = false;
        state.error = Some(message);
    }

    async fn cache_key(&self, key: &str) -> EngineResult<()> {
        self.cache.set(LICENSE_KEY_KEY, key).await?;
        self.cache.set(LICENSE_STATUS_KEY, STATUS_VALID).await
    }

    async fn forget_cached(&self) -> EngineResult<()> {
        self.cache.remove(LICENSE_KEY_KEY).await?;
        self.cache.remove(LICENSE_STATUS_KEY).await
    }
}
