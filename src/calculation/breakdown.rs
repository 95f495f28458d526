//! Human-readable explanation of a salary calculation.
//!
//! The breakdown restates the three calculation steps with formatted
//! amounts, and [`SalaryReport`] bundles it with the result, gauge reading
//! and formatted headline values for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::format::{NumberLocale, format_currency, format_percent};
use crate::models::{SalaryInput, SalaryResult, SalaryStatus, to_decimal};

use super::budget_health::BudgetHealth;
use super::validation::{FIELD_CURRENT_BUDGET, FIELD_INITIAL_BUDGET, FIELD_INITIAL_SALARY};

/// One numbered line of the breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownStep {
    /// Step number, starting at 1.
    pub number: u32,
    /// What the step computes.
    pub label: String,
    /// The formatted equation.
    pub expression: String,
}

/// The calculation restated step by step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationBreakdown {
    /// Ratio, salary and difference steps, in order.
    pub steps: Vec<BreakdownStep>,
    /// Summary of the salary movement.
    pub summary: String,
}

impl CalculationBreakdown {
    /// Builds the breakdown for a result.
    pub fn build(
        input: &SalaryInput,
        result: &SalaryResult,
        locale: &NumberLocale,
    ) -> EngineResult<Self> {
        let amounts = InputAmounts::from_input(input)?;
        let money = |value: Decimal| format_currency(value, locale);
        let ratio = format_percent(result.budget_ratio, 2);

        let steps = vec![
            BreakdownStep {
                number: 1,
                label: "Budget Ratio".to_string(),
                expression: format!(
                    "Budget Ratio = {} ÷ {} = {}",
                    money(amounts.current_budget),
                    money(amounts.initial_budget),
                    ratio
                ),
            },
            BreakdownStep {
                number: 2,
                label: "Current Salary".to_string(),
                expression: format!(
                    "Current Salary = {} × {} = {}",
                    money(amounts.initial_salary),
                    ratio,
                    money(result.current_salary)
                ),
            },
            BreakdownStep {
                number: 3,
                label: "Difference".to_string(),
                expression: format!(
                    "Difference = {} − {} = {}",
                    money(result.current_salary),
                    money(amounts.initial_salary),
                    money(result.salary_difference)
                ),
            },
        ];

        Ok(Self {
            steps,
            summary: summarize(result, locale),
        })
    }
}

/// Describes how the salary moved relative to the original.
pub fn summarize(result: &SalaryResult, locale: &NumberLocale) -> String {
    let amount = format_currency(result.salary_difference.abs(), locale);
    match result.status {
        SalaryStatus::Decrease => format!("{} less than original", amount),
        SalaryStatus::Increase => format!("{} more than original", amount),
        SalaryStatus::Unchanged => "No change from original salary".to_string(),
    }
}

/// Formatted headline values of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedResult {
    /// Current salary as currency.
    pub current_salary: String,
    /// Salary difference as currency.
    pub salary_difference: String,
    /// Budget ratio as a percentage.
    pub budget_ratio: String,
    /// Initial budget as currency.
    pub initial_budget: String,
    /// Current budget as currency.
    pub current_budget: String,
    /// Initial salary as currency.
    pub initial_salary: String,
    /// Badge label for the status.
    pub status_label: String,
}

/// A result together with everything needed to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryReport {
    /// The calculation result.
    pub result: SalaryResult,
    /// Formatted values.
    pub formatted: FormattedResult,
    /// Step-by-step explanation.
    pub breakdown: CalculationBreakdown,
    /// Gauge reading for the ratio.
    pub health: BudgetHealth,
}

impl SalaryReport {
    /// Builds the display bundle for a calculated result.
    pub fn build(
        input: &SalaryInput,
        result: SalaryResult,
        locale: &NumberLocale,
    ) -> EngineResult<Self> {
        let amounts = InputAmounts::from_input(input)?;
        let formatted = FormattedResult {
            current_salary: format_currency(result.current_salary, locale),
            salary_difference: format_currency(result.salary_difference, locale),
            budget_ratio: format_percent(result.budget_ratio, 2),
            initial_budget: format_currency(amounts.initial_budget, locale),
            current_budget: format_currency(amounts.current_budget, locale),
            initial_salary: format_currency(amounts.initial_salary, locale),
            status_label: result.status.label().to_string(),
        };

        Ok(Self {
            breakdown: CalculationBreakdown::build(input, &result, locale)?,
            health: BudgetHealth::from_ratio(result.budget_ratio),
            formatted,
            result,
        })
    }
}

struct InputAmounts {
    initial_budget: Decimal,
    current_budget: Decimal,
    initial_salary: Decimal,
}

impl InputAmounts {
    fn from_input(input: &SalaryInput) -> EngineResult<Self> {
        Ok(Self {
            initial_budget: display_amount(FIELD_INITIAL_BUDGET, input.initial_budget)?,
            current_budget: display_amount(FIELD_CURRENT_BUDGET, input.current_budget)?,
            initial_salary: display_amount(FIELD_INITIAL_SALARY, input.initial_salary)?,
        })
    }
}

/// Amounts below a trillionth show as zero.
fn display_amount(field: &str, value: f64) -> EngineResult<Decimal> {
    if value.abs() < 1e-12 {
        return Ok(Decimal::ZERO);
    }
    to_decimal(field, value)
}
