//! Salary calculation input and result models.
//!
//! This module contains the [`SalaryInput`] triple entered by the user, the
//! derived [`SalaryResult`], and the [`FieldError`] values produced by
//! validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The three figures a salary adjustment is computed from.
///
/// Values are kept as entered (`f64`), so a form can hand over anything it
/// parsed, including NaN; validation reports such values instead of the
/// calculation choking on them.
///
/// # Example
///
/// ```
/// use salary_engine::models::SalaryInput;
///
/// let input = SalaryInput::new(40_000_000.0, 35_000_000.0, 25_000_000.0);
/// assert_eq!(input.initial_budget, 40_000_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryInput {
    /// The project budget the salary was agreed against.
    pub initial_budget: f64,
    /// The project budget as it stands now.
    pub current_budget: f64,
    /// The salary agreed against the initial budget.
    pub initial_salary: f64,
}

impl SalaryInput {
    /// Creates an input triple.
    pub fn new(initial_budget: f64, current_budget: f64, initial_salary: f64) -> Self {
        Self {
            initial_budget,
            current_budget,
            initial_salary,
        }
    }

    /// Builds an input from free-form text fields.
    ///
    /// Each field is parsed with [`parse_amount`], so grouping separators and
    /// currency symbols are ignored and unparsable text becomes zero.
    ///
    /// ```
    /// use salary_engine::models::SalaryInput;
    ///
    /// let input = SalaryInput::from_text("40000000", "35,000,000 ₫", "");
    /// assert_eq!(input.current_budget, 35_000_000.0);
    /// assert_eq!(input.initial_salary, 0.0);
    /// ```
    pub fn from_text(initial_budget: &str, current_budget: &str, initial_salary: &str) -> Self {
        Self::new(
            parse_amount(initial_budget),
            parse_amount(current_budget),
            parse_amount(initial_salary),
        )
    }
}

/// Parses a user-entered amount.
///
/// Everything except ASCII digits and `.` is stripped, then the longest
/// leading `digits[.digits]` run is parsed. Empty or unparsable input yields
/// `0.0`.
///
/// Note that `.` survives stripping, so `"40.000.000"` parses as `40.0`:
/// forms that group with dots must strip them before calling this.
pub fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let numeric = match cleaned.match_indices('.').nth(1) {
        Some((second_dot, _)) => &cleaned[..second_dot],
        None => cleaned.as_str(),
    };

    numeric.parse::<f64>().unwrap_or(0.0)
}

/// Direction of the budget movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryStatus {
    /// The budget grew, so the salary grows with it.
    Increase,
    /// The budget shrank, so the salary shrinks with it.
    Decrease,
    /// The budget is exactly where it started.
    Unchanged,
}

impl SalaryStatus {
    /// Classifies a budget ratio.
    pub fn from_ratio(ratio: Decimal) -> Self {
        if ratio > Decimal::ONE {
            SalaryStatus::Increase
        } else if ratio < Decimal::ONE {
            SalaryStatus::Decrease
        } else {
            SalaryStatus::Unchanged
        }
    }

    /// The badge label shown next to a result.
    pub fn label(&self) -> &'static str {
        match self {
            SalaryStatus::Increase => "Budget Increased",
            SalaryStatus::Decrease => "Budget Decreased",
            SalaryStatus::Unchanged => "Budget Unchanged",
        }
    }
}

/// The outcome of a salary calculation.
///
/// Values are rounded half-up: `current_salary`, `budget_change` and
/// `salary_difference` to two places, `budget_ratio` to four. `status` is
/// derived from the ratio *before* rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryResult {
    /// The salary payable under the current budget.
    pub current_salary: Decimal,
    /// Current budget divided by initial budget.
    pub budget_ratio: Decimal,
    /// Budget movement in percent (`(ratio - 1) * 100`).
    pub budget_change: Decimal,
    /// Current salary minus initial salary.
    pub salary_difference: Decimal,
    /// Direction of the budget movement.
    pub status: SalaryStatus,
}

/// A validation problem scoped to one input field.
///
/// The field `general` is used for domain errors surfaced next to the form
/// rather than to a single input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The input field name (`initialBudget`, `currentBudget`,
    /// `initialSalary` or `general`).
    pub field: String,
    /// A human-readable message.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an error that is not tied to a specific field.
    pub fn general(message: impl Into<String>) -> Self {
        Self::new("general", message)
    }
}
