//! HTTP API module for the Salary Engine.
//!
//! This module provides the REST API endpoints for salary calculation,
//! employee management, payment history and license management.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AmountInput, CalculationRequest, LicenseRequest, SelectionRequest};
pub use response::{ApiError, ApiErrorResponse, CurrentSelection};
pub use state::AppState;
