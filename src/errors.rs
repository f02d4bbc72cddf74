//! Error types and validation functions for the statistical engine.
//!
//! All fallible operations in this crate return [`StatResult`]. Degenerate
//! numeric cases (zero variance, unmeasurable CV) are distinguished from
//! genuinely insufficient data: the former are reported through flags on the
//! result structs, the latter through [`StatError::InsufficientData`].

use thiserror::Error;

/// Error taxonomy for statistical analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum StatError {
    /// Insufficient data for the requested analysis.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Invalid parameter value for analysis configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Numerical computation failed due to instability or a degenerate input.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for the failure
        reason: String,
        /// Operation that failed, when known
        operation: Option<String>,
    },

    /// Input violates a mathematical domain requirement (e.g. Box-Cox
    /// requires strictly positive values even after shifting).
    #[error("Domain violation: {reason}")]
    DomainViolation {
        /// Description of the violated requirement
        reason: String,
    },
}

/// Result type for statistical analysis operations.
pub type StatResult<T> = Result<T, StatError>;

/// Validates that data has sufficient length for an analysis.
///
/// # Arguments
/// * `data` - Input values
/// * `min_required` - Minimum number of points required
/// * `operation` - Name of the operation requiring the data
pub fn validate_data_length(data: &[f64], min_required: usize, operation: &str) -> StatResult<()> {
    if data.len() < min_required {
        log::debug!(
            "{}: rejected input of length {} (minimum {})",
            operation,
            data.len(),
            min_required
        );
        return Err(StatError::InsufficientData {
            required: min_required,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Validates that every value is finite (no NaN or infinity).
pub fn validate_all_finite(data: &[f64], operation: &str) -> StatResult<()> {
    for (i, &value) in data.iter().enumerate() {
        if !value.is_finite() {
            return Err(StatError::NumericalError {
                reason: format!("Non-finite value {} at index {}", value, i),
                operation: Some(operation.to_string()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_data_length() {
        let data = vec![1.0, 2.0, 3.0];
        assert!(validate_data_length(&data, 3, "test").is_ok());
        let err = validate_data_length(&data, 4, "test").unwrap_err();
        assert_eq!(
            err,
            StatError::InsufficientData {
                required: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_validate_all_finite() {
        assert!(validate_all_finite(&[1.0, -2.5, 0.0], "test").is_ok());
        assert!(validate_all_finite(&[1.0, f64::NAN], "test").is_err());
        assert!(validate_all_finite(&[f64::INFINITY], "test").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = StatError::InsufficientData {
            required: 3,
            actual: 1,
        };
        assert!(err.to_string().contains("at least 3"));
    }
}
