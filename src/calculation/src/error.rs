//! Error types for pitch resolution, synthesis and calibration.

use thiserror::Error;

/// Errors raised by the flight engine.
///
/// Every variant is recoverable: the caller skips the pitch, clamps an input
/// control, or logs once and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PitchError {
    /// An observed record lacks a field the kinematics needs
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A design or observed record has no real plate-crossing solution
    #[error("Invalid pitch spec: {0}")]
    InvalidPitchSpec(String),

    /// Commitment point outside the reference pitch's own flight window
    #[error("Invalid tunnel point: {value} not in ({min}, {max})")]
    InvalidTunnelPoint {
        /// Rejected commit time or distance
        value: f64,
        /// Exclusive lower bound
        min: f64,
        /// Exclusive upper bound
        max: f64,
    },

    /// A numeric input is NaN or infinite
    #[error("Malformed input: {field} = {value}")]
    MalformedInput {
        /// Name of the offending input
        field: &'static str,
        /// The non-finite value
        value: f64,
    },

    /// A drag curve could not be fitted or fails its shape checks
    #[error("Calibration error: {0}")]
    Calibration(String),
}

/// Convenience Result type using PitchError
pub type Result<T> = std::result::Result<T, PitchError>;

/// Reject NaN and infinities with a `MalformedInput` naming the field.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PitchError::MalformedInput { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("speed_mph", 95.0), Ok(95.0));
        let err = ensure_finite("speed_mph", f64::NAN).unwrap_err();
        assert!(matches!(err, PitchError::MalformedInput { field: "speed_mph", .. }));
    }

    #[test]
    fn test_display() {
        let err = PitchError::MissingField("release_extension");
        assert_eq!(err.to_string(), "Missing field: release_extension");

        let err = PitchError::InvalidTunnelPoint { value: 0.5, min: 0.0, max: 0.41 };
        assert_eq!(err.to_string(), "Invalid tunnel point: 0.5 not in (0, 0.41)");
    }
}
