//! Request types for the Salary Engine API.
//!
//! Employee payloads reuse [`NewEmployee`](crate::models::NewEmployee) and
//! [`EmployeeUpdate`](crate::models::EmployeeUpdate) directly; the types
//! here cover the remaining endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{SalaryInput, parse_amount};

/// An amount as sent by a client: a JSON number, or text as typed into a
/// form (`"35,000,000 ₫"`, `"1500"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// A numeric amount.
    Number(f64),
    /// Free-form text, parsed with [`parse_amount`].
    Text(String),
}

impl AmountInput {
    /// The numeric value. Unparsable text is zero.
    pub fn value(&self) -> f64 {
        match self {
            AmountInput::Number(value) => *value,
            AmountInput::Text(text) => parse_amount(text),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

/// Request body for `POST /calculate` and `POST /employees/{id}/payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    /// The project budget the salary was agreed against.
    pub initial_budget: AmountInput,
    /// The project budget as it stands now.
    pub current_budget: AmountInput,
    /// The agreed salary.
    pub initial_salary: AmountInput,
}

impl CalculationRequest {
    /// Creates a numeric request.
    pub fn new(initial_budget: f64, current_budget: f64, initial_salary: f64) -> Self {
        Self {
            initial_budget: initial_budget.into(),
            current_budget: current_budget.into(),
            initial_salary: initial_salary.into(),
        }
    }
}

impl From<&CalculationRequest> for SalaryInput {
    fn from(request: &CalculationRequest) -> Self {
        SalaryInput::new(
            request.initial_budget.value(),
            request.current_budget.value(),
            request.initial_salary.value(),
        )
    }
}

/// Request body for `PUT /session/current`. A null id clears the
/// selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    /// The employee to select.
    #[serde(default, alias = "employee_id")]
    pub employee_id: Option<Uuid>,
}

/// Request body for `POST /license`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRequest {
    /// The license key to validate.
    pub key: String,
}
