//! Error types for the payroll calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading rule tables or
//! running a calculation.

use thiserror::Error;

/// The main error type for the payroll calculation engine.
///
/// Every calculator returns this error type. Errors are local to a single
/// calculation call; no calculator keeps state between calls.
///
/// # Example
///
/// ```
/// use folha_engine::error::EngineError;
///
/// let error = EngineError::UnsupportedValue {
///     kind: "registration type".to_string(),
///     value: "estagiario".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unsupported registration type: estagiario");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A rule-table file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A rule-table file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A calculation input was out of its valid domain.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The input field that was invalid.
        field: String,
        /// A description of what made the input invalid.
        message: String,
    },

    /// An enumerated input carried a value the engine does not support.
    #[error("Unsupported {kind}: {value}")]
    UnsupportedValue {
        /// What kind of value was rejected (e.g. "registration type").
        kind: String,
        /// The rejected value, verbatim.
        value: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::UnsupportedValue`].
    pub fn unsupported(kind: impl Into<String>, value: impl Into<String>) -> Self {
        EngineError::UnsupportedValue {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/inss.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/inss.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/irrf.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/irrf.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::invalid_input("gross_salary", "must be greater than zero");
        assert_eq!(
            error.to_string(),
            "Invalid input 'gross_salary': must be greater than zero"
        );
    }

    #[test]
    fn test_unsupported_value_names_the_value() {
        let error = EngineError::unsupported("tax regime", "mei");
        assert_eq!(error.to_string(), "Unsupported tax regime: mei");
    }

    #[test]
    fn test_calculation_error_displays_message() {
        let error = EngineError::CalculationError {
            message: "empty bracket table".to_string(),
        };
        assert_eq!(error.to_string(), "Calculation error: empty bracket table");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_invalid() -> EngineResult<()> {
            Err(EngineError::invalid_input("dependents", "negative"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_invalid()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
