//! Proportional salary calculation.
//!
//! The salary follows the project budget linearly:
//! `current_salary = initial_salary * (current_budget / initial_budget)`.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{SalaryInput, SalaryResult, SalaryStatus, to_decimal};

use super::validation::{FIELD_CURRENT_BUDGET, FIELD_INITIAL_BUDGET, FIELD_INITIAL_SALARY};

/// Decimal places kept for money amounts and the budget change percentage.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Decimal places kept for the budget ratio.
pub const RATIO_DECIMAL_PLACES: u32 = 4;

/// Largest magnitude an amount or calculated figure may reach. Decimals top
/// out just below `7.92e28`, and a ratio must still fit once shown as a
/// percentage.
pub const MAX_CALCULABLE_AMOUNT: f64 = 1e26;

/// Smallest nonzero magnitude converted to a decimal before calculating.
/// Smaller amounts lose digits in the conversion.
const MIN_EXACT_AMOUNT: f64 = 1e-12;

/// Calculates the adjusted salary for a budget change.
///
/// The steps run in a fixed order on unrounded values: ratio, salary,
/// change percentage, difference. Rounding (half up) happens last, and the
/// status is taken from the *unrounded* ratio, so a ratio of `1.00001`
/// reports [`SalaryStatus::Increase`] even though it rounds to `1`.
///
/// Amounts are converted to decimals and calculated exactly. Amounts too
/// small or too large to convert faithfully, and intermediate values that
/// overflow, are calculated in floating point instead and converted after
/// rounding.
///
/// # Errors
///
/// * [`EngineError::DivisionByZero`] if the initial budget is zero. Run
///   [`validate_inputs`](super::validate_inputs) first to report this as a
///   field error instead.
/// * [`EngineError::InvalidAmount`] if an input is NaN or infinite.
/// * [`EngineError::CalculationError`] if a rounded figure exceeds
///   [`MAX_CALCULABLE_AMOUNT`]. Validated input never fails this way.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use salary_engine::calculation::calculate_salary;
/// use salary_engine::models::{SalaryInput, SalaryStatus};
/// use std::str::FromStr;
///
/// let input = SalaryInput::new(40_000_000.0, 35_000_000.0, 25_000_000.0);
/// let result = calculate_salary(&input).unwrap();
///
/// assert_eq!(result.budget_ratio, Decimal::from_str("0.875").unwrap());
/// assert_eq!(result.current_salary, Decimal::from(21_875_000));
/// assert_eq!(result.salary_difference, Decimal::from(-3_125_000));
/// assert_eq!(result.status, SalaryStatus::Decrease);
/// ```
pub fn calculate_salary(input: &SalaryInput) -> EngineResult<SalaryResult> {
    if input.initial_budget == 0.0 {
        return Err(EngineError::DivisionByZero);
    }
    for (field, value) in [
        (FIELD_INITIAL_BUDGET, input.initial_budget),
        (FIELD_CURRENT_BUDGET, input.current_budget),
        (FIELD_INITIAL_SALARY, input.initial_salary),
    ] {
        if !value.is_finite() {
            return Err(EngineError::InvalidAmount {
                field: field.to_string(),
            });
        }
    }

    match calculate_exact(input) {
        Some(result) => Ok(result),
        None => {
            debug!(
                initial_budget = input.initial_budget,
                current_budget = input.current_budget,
                "Amounts outside exact decimal range, calculating in floating point"
            );
            calculate_approximate(input)
        }
    }
}

fn calculate_exact(input: &SalaryInput) -> Option<SalaryResult> {
    let exact = |field: &str, value: f64| {
        let magnitude = value.abs();
        if value != 0.0 && !(MIN_EXACT_AMOUNT..=MAX_CALCULABLE_AMOUNT).contains(&magnitude) {
            return None;
        }
        to_decimal(field, value).ok()
    };
    let initial_budget = exact(FIELD_INITIAL_BUDGET, input.initial_budget)?;
    let current_budget = exact(FIELD_CURRENT_BUDGET, input.current_budget)?;
    let initial_salary = exact(FIELD_INITIAL_SALARY, input.initial_salary)?;

    let budget_ratio = current_budget.checked_div(initial_budget)?;
    let current_salary = initial_salary.checked_mul(budget_ratio)?;
    let budget_change = budget_ratio
        .checked_sub(Decimal::ONE)?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    let salary_difference = current_salary.checked_sub(initial_salary)?;

    Some(SalaryResult {
        current_salary: round_half_up(current_salary, MONEY_DECIMAL_PLACES),
        budget_ratio: round_half_up(budget_ratio, RATIO_DECIMAL_PLACES),
        budget_change: round_half_up(budget_change, MONEY_DECIMAL_PLACES),
        salary_difference: round_half_up(salary_difference, MONEY_DECIMAL_PLACES),
        status: SalaryStatus::from_ratio(budget_ratio),
    })
}

fn calculate_approximate(input: &SalaryInput) -> EngineResult<SalaryResult> {
    let budget_ratio = input.current_budget / input.initial_budget;
    let current_salary = input.initial_salary * budget_ratio;
    let budget_change = (budget_ratio - 1.0) * 100.0;
    let salary_difference = current_salary - input.initial_salary;

    let status = if budget_ratio > 1.0 {
        SalaryStatus::Increase
    } else if budget_ratio < 1.0 {
        SalaryStatus::Decrease
    } else {
        SalaryStatus::Unchanged
    };

    Ok(SalaryResult {
        current_salary: rounded_decimal("current salary", current_salary, MONEY_DECIMAL_PLACES)?,
        budget_ratio: rounded_decimal("budget ratio", budget_ratio, RATIO_DECIMAL_PLACES)?,
        budget_change: rounded_decimal("budget change", budget_change, MONEY_DECIMAL_PLACES)?,
        salary_difference: rounded_decimal(
            "salary difference",
            salary_difference,
            MONEY_DECIMAL_PLACES,
        )?,
        status,
    })
}

/// Rounds `value` half up in floating point, then converts it.
fn rounded_decimal(quantity: &str, value: f64, decimal_places: u32) -> EngineResult<Decimal> {
    let scale = 10f64.powi(decimal_places as i32);
    let rounded = (value * scale + 0.5).floor() / scale;
    if !rounded.is_finite() || rounded.abs() > MAX_CALCULABLE_AMOUNT {
        return Err(overflow(quantity));
    }
    let converted = Decimal::try_from(rounded).map_err(|_| overflow(quantity))?;
    // Drop the binary representation noise left by the conversion.
    Ok(round_half_up(converted, decimal_places))
}

fn overflow(quantity: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("{} is out of range", quantity),
    }
}

/// Rounds half up on the scaled value: `floor(value * 10^dp + 0.5) / 10^dp`.
///
/// Halves always move toward positive infinity, so `-2.5` rounds to `-2`.
/// The result is normalized (no trailing zeros).
///
/// ```
/// use rust_decimal::Decimal;
/// use salary_engine::calculation::round_half_up;
/// use std::str::FromStr;
///
/// let d = |s: &str| Decimal::from_str(s).unwrap();
/// assert_eq!(round_half_up(d("1.005"), 2), d("1.01"));
/// assert_eq!(round_half_up(d("-0.125"), 2), d("-0.12"));
/// ```
pub fn round_half_up(value: Decimal, decimal_places: u32) -> Decimal {
    let scale = Decimal::from(10u64.pow(decimal_places));
    let half = Decimal::new(5, 1);

    value
        .checked_mul(scale)
        .and_then(|scaled| scaled.checked_add(half))
        .map(|shifted| shifted.floor() / scale)
        .unwrap_or_else(|| {
            value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
        })
        .normalize()
}
