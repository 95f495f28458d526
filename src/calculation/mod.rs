//! Calculation logic for the Salary Engine.
//!
//! This module contains input validation, the proportional salary
//! calculation with its rounding policy, and the display helpers built on a
//! result: the step-by-step breakdown and the budget health gauge.

mod breakdown;
mod budget_health;
mod salary;
mod validation;

pub use breakdown::{
    BreakdownStep, CalculationBreakdown, FormattedResult, SalaryReport, summarize,
};
pub use budget_health::{BudgetHealth, BudgetHealthBand};
pub use salary::{
    MAX_CALCULABLE_AMOUNT, MONEY_DECIMAL_PLACES, RATIO_DECIMAL_PLACES, calculate_salary,
    round_half_up,
};
pub use validation::{
    FIELD_CURRENT_BUDGET, FIELD_INITIAL_BUDGET, FIELD_INITIAL_SALARY, validate_inputs,
};
