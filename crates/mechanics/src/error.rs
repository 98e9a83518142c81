//! Error types for the opt-in checked evaluation paths and configuration.
//!
//! The unchecked model functions never produce these.

use thiserror::Error;

/// Errors raised by parameter validation, checked evaluation and config parsing
#[derive(Error, Debug)]
pub enum ModelError {
    /// Slip angles divide by `vx`; the model is singular at standstill
    #[error("Longitudinal velocity vx = {vx} is zero or non-finite; slip angles are undefined")]
    StandstillSingularity {
        /// Offending longitudinal velocity (m/s)
        vx: f64,
    },

    /// A state field is NaN or infinite
    #[error("State field `{field}` is not finite")]
    NonFiniteState {
        /// Name of the first non-finite field
        field: &'static str,
    },

    /// A vehicle or tire parameter is outside its physical range
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f64,
        /// What the value must satisfy
        reason: &'static str,
    },

    /// Configuration JSON could not be parsed or emitted
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

pub(crate) fn ensure(
    ok: bool,
    name: &'static str,
    value: f64,
    reason: &'static str,
) -> Result<(), ModelError> {
    if ok {
        Ok(())
    } else {
        Err(ModelError::InvalidParameter { name, value, reason })
    }
}
