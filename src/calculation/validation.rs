//! Input validation for salary calculations.
//!
//! Every rule is checked independently so the caller can show all problems
//! at once; nothing short-circuits.

use crate::models::{FieldError, SalaryInput};

use super::salary::MAX_CALCULABLE_AMOUNT;

/// Field name for the initial budget.
pub const FIELD_INITIAL_BUDGET: &str = "initialBudget";
/// Field name for the current budget.
pub const FIELD_CURRENT_BUDGET: &str = "currentBudget";
/// Field name for the initial salary.
pub const FIELD_INITIAL_SALARY: &str = "initialSalary";

/// Checks a salary input for well-formedness.
///
/// Returns one [`FieldError`] per violated rule, in rule order; an empty
/// vector means the input is valid. An initial budget of exactly zero
/// violates two rules (the general budget check and the explicit
/// division-by-zero check), so it yields two errors on `initialBudget`.
///
/// The fields have no business upper bound. When all three pass, one more
/// rule rejects input whose amounts or adjusted figures would exceed
/// [`MAX_CALCULABLE_AMOUNT`], reported as a `general` error. Input that
/// passes every rule always calculates and formats.
///
/// # Examples
///
/// ```
/// use salary_engine::calculation::validate_inputs;
/// use salary_engine::models::SalaryInput;
///
/// assert!(validate_inputs(&SalaryInput::new(100.0, 90.0, 50.0)).is_empty());
///
/// let errors = validate_inputs(&SalaryInput::new(0.0, 10.0, 10.0));
/// assert_eq!(errors.len(), 2);
/// assert!(errors.iter().all(|e| e.field == "initialBudget"));
/// ```
pub fn validate_inputs(input: &SalaryInput) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if !input.initial_budget.is_finite() || input.initial_budget <= 0.0 {
        errors.push(FieldError::new(
            FIELD_INITIAL_BUDGET,
            "Initial Budget must be a non-negative number.",
        ));
    }

    if input.initial_budget == 0.0 {
        errors.push(FieldError::new(
            FIELD_INITIAL_BUDGET,
            "Initial Budget cannot be zero (division by zero).",
        ));
    }

    if !is_non_negative(input.current_budget) {
        errors.push(FieldError::new(
            FIELD_CURRENT_BUDGET,
            "Current Budget must be a non-negative number.",
        ));
    }

    if !is_non_negative(input.initial_salary) {
        errors.push(FieldError::new(
            FIELD_INITIAL_SALARY,
            "Initial Salary must be a non-negative number.",
        ));
    }

    if errors.is_empty() && !amounts_in_range(input) {
        errors.push(FieldError::general(
            "The amounts are too large to calculate. Check the budget amounts.",
        ));
    }

    errors
}

fn amounts_in_range(input: &SalaryInput) -> bool {
    let ratio = input.current_budget / input.initial_budget;
    let salary = input.initial_salary * ratio;
    [
        input.initial_budget,
        input.current_budget,
        input.initial_salary,
        ratio,
        salary,
        (ratio - 1.0) * 100.0,
        salary - input.initial_salary,
    ]
    .iter()
    .all(|value| value.is_finite() && value.abs() < MAX_CALCULABLE_AMOUNT)
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
