//! Core data models for the Salary Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod salary;

pub use employee::{Employee, EmployeeUpdate, NewEmployee, PaymentRecord};
pub(crate) use employee::to_decimal;
pub use salary::{FieldError, SalaryInput, SalaryResult, SalaryStatus, parse_amount};
