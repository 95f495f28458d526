//! Salary Engine: budget-proportional salary adjustment
//!
//! This crate scales an employee's agreed salary by the ratio between a
//! project's current and initial budget, explains the result, and keeps a
//! per-employee history of saved calculations behind a license check.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod format;
pub mod license;
pub mod models;
pub mod repository;
pub mod session;
pub mod storage;
pub mod telemetry;
