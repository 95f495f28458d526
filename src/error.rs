//! Error types for the Salary Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure that can occur while calculating, persisting or
//! licensing. Field-level input problems are not errors in this sense: they
//! are collected as [`FieldError`](crate::models::FieldError) values by
//! validation and never returned through [`EngineError`].

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the Salary Engine.
///
/// # Example
///
/// ```
/// use salary_engine::error::EngineError;
///
/// let error = EngineError::DivisionByZero;
/// assert_eq!(
///     error.to_string(),
///     "Cannot calculate: Initial Budget is zero (division by zero)."
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The initial budget was zero, so no budget ratio exists.
    #[error("Cannot calculate: Initial Budget is zero (division by zero).")]
    DivisionByZero,

    /// An input could not be represented as a decimal amount (NaN,
    /// infinite, or beyond the decimal range).
    #[error("Cannot calculate: {field} cannot be represented as a decimal amount")]
    InvalidAmount {
        /// The offending input field.
        field: String,
    },

    /// Decimal arithmetic overflowed during a calculation.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// An employee payload was invalid.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No employee exists with the given identifier.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The identifier that was looked up.
        id: Uuid,
    },

    /// The persistence backend failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// Stored or received data could not be (de)serialized.
    #[error("Serialization error: {message}")]
    Serialization {
        /// A description of the serialization failure.
        message: String,
    },

    /// The license authority could not be reached or answered with an
    /// unexpected response.
    #[error("License server error: {message}")]
    LicenseServer {
        /// A description of the transport failure.
        message: String,
    },

    /// The history view was requested without a valid license.
    #[error("A valid license is required to view payment history")]
    Unlicensed,

    /// A feature is disabled because its configuration is missing.
    #[error("{feature} is not configured: {message}")]
    NotConfigured {
        /// The disabled feature.
        feature: String,
        /// What is missing.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file or environment could not be parsed.
    #[error("Failed to parse configuration '{path}': {message}")]
    ConfigParseError {
        /// The path (or source name) that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Storage`] from any displayable cause.
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        EngineError::Storage {
            message: cause.to_string(),
        }
    }

    /// Returns true for failures of I/O against a backend, as opposed to
    /// domain or configuration problems.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            EngineError::Storage { .. }
                | EngineError::Serialization { .. }
                | EngineError::LicenseServer { .. }
        )
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::Serialization {
            message: error.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_by_zero_message() {
        assert_eq!(
            EngineError::DivisionByZero.to_string(),
            "Cannot calculate: Initial Budget is zero (division by zero)."
        );
    }

    #[test]
    fn test_employee_not_found_displays_id() {
        let id = Uuid::nil();
        let error = EngineError::EmployeeNotFound { id };
        assert_eq!(
            error.to_string(),
            "Employee not found: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_invalid_employee_displays_field_and_message() {
        let error = EngineError::InvalidEmployee {
            field: "name".to_string(),
            message: "must not be blank".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid employee field 'name': must not be blank"
        );
    }

    #[test]
    fn test_not_configured_displays_feature() {
        let error = EngineError::NotConfigured {
            feature: "License server".to_string(),
            message: "missing api key".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "License server is not configured: missing api key"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_io_classification() {
        assert!(EngineError::storage("disk full").is_io());
        assert!(
            EngineError::LicenseServer {
                message: "timeout".to_string()
            }
            .is_io()
        );
        assert!(!EngineError::DivisionByZero.is_io());
        assert!(!EngineError::Unlicensed.is_io());
    }

    #[test]
    fn test_serde_json_error_converts_to_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let engine_error: EngineError = err.into();
        assert!(matches!(engine_error, EngineError::Serialization { .. }));
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_division_by_zero() -> EngineResult<()> {
            Err(EngineError::DivisionByZero)
        }

        fn propagates_error() -> EngineResult<()> {
            returns_division_by_zero()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
