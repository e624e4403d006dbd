//! Shared numeric validation helpers.
//!
//! Provides reusable range-checking functions used by the schema modules.
//! Every helper names the offending field in its `CoreError::Validation`.

use crate::error::CoreError;

/// Validate that a value is a finite number (not NaN or infinite).
pub fn validate_finite(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a value falls within `[0.0, 1.0]`.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    validate_range(value, 0.0, 1.0, name)
}

/// Validate that a value falls within `[min, max]`.
pub fn validate_range(value: f64, min: f64, max: f64, name: &str) -> Result<(), CoreError> {
    validate_finite(value, name)?;
    if !(min..=max).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a value is finite and `>= 0.0`.
pub fn validate_non_negative(value: f64, name: &str) -> Result<(), CoreError> {
    validate_finite(value, name)?;
    if value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(())
}
