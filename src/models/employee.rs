//! Employee model and related payloads.
//!
//! This module defines the [`Employee`] profile, the [`NewEmployee`] and
//! [`EmployeeUpdate`] payloads used to create and edit it, and the
//! [`PaymentRecord`] snapshots that make up an employee's history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{SalaryInput, SalaryResult, SalaryStatus};

/// An immutable snapshot of one saved salary calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// When the calculation was saved.
    pub date: DateTime<Utc>,
    /// The initial budget used.
    pub initial_budget: Decimal,
    /// The current budget used.
    pub current_budget: Decimal,
    /// The initial salary used.
    pub initial_salary: Decimal,
    /// The salary paid out (the calculated current salary).
    pub final_salary: Decimal,
    /// The rounded budget ratio.
    pub budget_ratio: Decimal,
}

impl PaymentRecord {
    /// Snapshots a calculation taken at `date`.
    ///
    /// Fails with [`EngineError::InvalidAmount`] if an input figure cannot be
    /// represented as a decimal; validated input never fails this way.
    pub fn from_calculation(
        input: &SalaryInput,
        result: &SalaryResult,
        date: DateTime<Utc>,
    ) -> EngineResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            initial_budget: to_decimal("initialBudget", input.initial_budget)?,
            current_budget: to_decimal("currentBudget", input.current_budget)?,
            initial_salary: to_decimal("initialSalary", input.initial_salary)?,
            final_salary: result.current_salary,
            budget_ratio: result.budget_ratio,
        })
    }

    /// Direction of the recorded budget movement.
    pub fn status(&self) -> SalaryStatus {
        SalaryStatus::from_ratio(self.budget_ratio)
    }
}

/// Converts an entered figure to a decimal amount.
pub(crate) fn to_decimal(field: &str, value: f64) -> EngineResult<Decimal> {
    Decimal::try_from(value).map_err(|_| EngineError::InvalidAmount {
        field: field.to_string(),
    })
}

/// An employee whose salary follows a project budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier, assigned on creation and never changed.
    pub id: Uuid,
    /// Full name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Bank account number salaries are paid to.
    #[serde(default)]
    pub bank_account: Option<String>,
    /// Name of the bank account holder.
    #[serde(default)]
    pub bank_account_holder: Option<String>,
    /// The project budget the salary was agreed against.
    pub initial_budget: Decimal,
    /// The agreed salary.
    pub initial_salary: Decimal,
    /// Saved calculations, newest first.
    #[serde(default)]
    pub history: Vec<PaymentRecord>,
}

impl Employee {
    /// Creates an employee with a fresh identifier and empty history.
    pub fn create(new: NewEmployee) -> EngineResult<Self> {
        new.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            email: non_blank(new.email),
            bank_account: non_blank(new.bank_account),
            bank_account_holder: non_blank(new.bank_account_holder),
            initial_budget: new.initial_budget,
            initial_salary: new.initial_salary,
            history: Vec::new(),
        })
    }

    /// Returns a copy with `update` applied; `id` and `history` are kept.
    pub fn with_update(&self, update: EmployeeUpdate) -> EngineResult<Self> {
        update.validate()?;
        let mut updated = self.clone();
        if let Some(name) = update.name {
            updated.name = name.trim().to_string();
        }
        if let Some(email) = update.email {
            updated.email = non_blank(Some(email));
        }
        if let Some(bank_account) = update.bank_account {
            updated.bank_account = non_blank(Some(bank_account));
        }
        if let Some(holder) = update.bank_account_holder {
            updated.bank_account_holder = non_blank(Some(holder));
        }
        if let Some(initial_budget) = update.initial_budget {
            updated.initial_budget = initial_budget;
        }
        if let Some(initial_salary) = update.initial_salary {
            updated.initial_salary = initial_salary;
        }
        Ok(updated)
    }

    /// Returns a copy with `record` at the front of the history.
    pub fn with_payment(&self, record: PaymentRecord) -> Self {
        let mut updated = self.clone();
        updated.history.insert(0, record);
        updated
    }

    /// The most recent saved calculation, if any.
    pub fn latest_payment(&self) -> Option<&PaymentRecord> {
        self.history.first()
    }
}

/// Payload for creating an [`Employee`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    /// Full name (required).
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Bank account number.
    #[serde(default)]
    pub bank_account: Option<String>,
    /// Name of the bank account holder.
    #[serde(default)]
    pub bank_account_holder: Option<String>,
    /// The agreed initial project budget.
    pub initial_budget: Decimal,
    /// The agreed initial salary.
    pub initial_salary: Decimal,
}

impl NewEmployee {
    fn validate(&self) -> EngineResult<()> {
        validate_name(&self.name)?;
        validate_amount("initialBudget", self.initial_budget)?;
        validate_amount("initialSalary", self.initial_salary)
    }
}

/// Partial update of an [`Employee`]. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    /// New full name.
    #[serde(default)]
    pub name: Option<String>,
    /// New email; an empty string clears it.
    #[serde(default)]
    pub email: Option<String>,
    /// New bank account; an empty string clears it.
    #[serde(default)]
    pub bank_account: Option<String>,
    /// New account holder; an empty string clears it.
    #[serde(default)]
    pub bank_account_holder: Option<String>,
    /// New initial budget.
    #[serde(default)]
    pub initial_budget: Option<Decimal>,
    /// New initial salary.
    #[serde(default)]
    pub initial_salary: Option<Decimal>,
}

impl EmployeeUpdate {
    fn validate(&self) -> EngineResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(initial_budget) = self.initial_budget {
            validate_amount("initialBudget", initial_budget)?;
        }
        if let Some(initial_salary) = self.initial_salary {
            validate_amount("initialSalary", initial_salary)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::InvalidEmployee {
            field: "name".to_string(),
            message: "must not be blank".to_string(),
        });
    }
    Ok(())
}

fn validate_amount(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::InvalidEmployee {
            field: field.to_string(),
            message: "must be a non-negative amount".to_string(),
        });
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
