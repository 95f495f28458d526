//! Session context for the Salary Engine.
//!
//! A [`Session`] bundles the employee repository, the entitlement gate and
//! the display locale. It is built once from the configuration, loaded
//! explicitly with [`Session::load`], and shared by every request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{SalaryReport, calculate_salary, validate_inputs};
use crate::config::{AppConfig, StorageBackend};
use crate::error::EngineResult;
use crate::format::NumberLocale;
use crate::license::{EntitlementGate, HttpLicenseAuthority, LicenseAuthority};
use crate::models::{FieldError, PaymentRecord, SalaryInput};
use crate::repository::{EmployeeRepository, EmployeeStore, LocalEmployeeStore, RestEmployeeStore};
use crate::storage::{FileKeyValueStore, KeyValueStore};

/// Either a value or the field errors that prevented it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated<T> {
    /// The input was accepted.
    Valid(T),
    /// The input was rejected; at least one error.
    Invalid(Vec<FieldError>),
}

impl<T> Validated<T> {
    /// The accepted value, if any.
    pub fn valid(self) -> Option<T> {
        match self {
            Validated::Valid(value) => Some(value),
            Validated::Invalid(_) => None,
        }
    }
}

/// A saved payment record with the report it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPayment {
    /// The stored record.
    pub record: PaymentRecord,
    /// The calculation behind it.
    pub report: SalaryReport,
}

/// Shared state of a running application.
pub struct Session {
    repository: EmployeeRepository,
    gate: Arc<EntitlementGate>,
    locale: NumberLocale,
}

impl Session {
    /// Creates a session from its parts.
    pub fn new(repository: EmployeeRepository, gate: Arc<EntitlementGate>, locale: NumberLocale) -> Self {
        Self {
            repository,
            gate,
            locale,
        }
    }

    /// Wires up the backends selected by `config`.
    ///
    /// The license cache always lives under `storage.data_dir`. A missing
    /// license server only disables validation; a remote storage backend
    /// without credentials is an error.
    pub fn from_config(config: &AppConfig) -> EngineResult<Self> {
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.storage.data_dir));

        let store: Arc<dyn EmployeeStore> = match config.storage.backend {
            StorageBackend::Local => Arc::new(LocalEmployeeStore::new(Arc::clone(&kv))),
            StorageBackend::Remote => {
                let (url, api_key) = config.storage.remote_settings()?;
                Arc::new(RestEmployeeStore::new(url, api_key).with_timeout(config.request_timeout()))
            }
        };

        let authority: Option<Arc<dyn LicenseAuthority>> = match config.license.settings() {
            Ok((url, api_key)) => Some(Arc::new(
                HttpLicenseAuthority::new(url, api_key).with_timeout(config.request_timeout()),
            )),
            Err(err) => {
                warn!(error = %err, "License validation disabled");
                None
            }
        };

        info!(
            backend = ?config.storage.backend,
            locale = config.locale.as_str(),
            "Session configured"
        );
        Ok(Self::new(
            EmployeeRepository::new(store),
            Arc::new(EntitlementGate::new(authority, kv)),
            config.number_locale(),
        ))
    }

    /// Loads employees and restores a cached license, then re-checks the
    /// license in the background.
    ///
    /// Failures are logged and leave the session empty or unlicensed; they
    /// never abort startup.
    pub async fn load(&self) {
        if let Err(err) = self.repository.load().await {
            warn!(error = %err, "Starting with an empty employee list");
        }

        match self.gate.restore().await {
            Ok(true) => {
                self.gate.spawn_revalidation();
            }
            Ok(false) => {}
            Err(err) => warn!(error = %err, "Could not read the license cache"),
        }
    }

    /// Validates `input` and computes its report.
    ///
    /// Calculation failures on validated input are reported as a single
    /// `general` field error.
    pub fn calculate(&self, input: &SalaryInput) -> Validated<SalaryReport> {
        let errors = validate_inputs(input);
        if !errors.is_empty() {
            return Validated::Invalid(errors);
        }

        match calculate_salary(input).and_then(|result| SalaryReport::build(input, result, &self.locale)) {
            Ok(report) => Validated::Valid(report),
            Err(err) => Validated::Invalid(vec![FieldError::general(err.to_string())]),
        }
    }

    /// Calculates `input` and saves it to the history of `employee_id`.
    pub async fn save_payment(
        &self,
        employee_id: Uuid,
        input: &SalaryInput,
    ) -> EngineResult<Validated<SavedPayment>> {
        let report = match self.calculate(input) {
            Validated::Valid(report) => report,
            Validated::Invalid(errors) => return Ok(Validated::Invalid(errors)),
        };

        let record = self
            .repository
            .append_payment(employee_id, input, &report.result)
            .await?;
        Ok(Validated::Valid(SavedPayment { record, report }))
    }

    /// The payment history of `employee_id`, newest first. Requires a
    /// license.
    pub async fn history(&self, employee_id: Uuid) -> EngineResult<Vec<PaymentRecord>> {
        self.gate.ensure_licensed().await?;
        self.repository.history(employee_id).await
    }

    /// The employee repository.
    pub fn repository(&self) -> &EmployeeRepository {
        &self.repository
    }

    /// The entitlement gate.
    pub fn gate(&self) -> &Arc<EntitlementGate> {
        &self.gate
    }

    /// The display locale.
    pub fn locale(&self) -> &NumberLocale {
        &self.locale
    }
}
