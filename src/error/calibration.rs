// Calibration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Calibration error code constants exposed at the API boundary
///
/// These constants provide a single source of truth for error codes
/// shared between the core and any transport layer sitting on top of it.
///
/// Error code range: 2001-2002
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// Requested profile name is not a known preset
    pub const UNKNOWN_PROFILE: i32 = 2001;

    /// Custom thresholds violate the ordering/positivity invariant
    pub const INVALID_THRESHOLDS: i32 = 2002;
}

/// Log a calibration error with structured context
///
/// Logs calibration errors with the numeric error code, the component
/// where the error occurred and a human-readable message. Logging is
/// non-blocking and never panics.
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, component=CalibrationStore, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Calibration-related errors
///
/// These errors cover profile switching and custom threshold validation.
/// Both variants reject the mutation and leave the previous store state
/// untouched.
///
/// Error code range: 2001-2002
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    /// Requested profile name is not a known preset
    UnknownProfile { name: String },

    /// Custom thresholds violate the ordering/positivity invariant
    InvalidThresholds { reason: String },
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::UnknownProfile { .. } => CalibrationErrorCodes::UNKNOWN_PROFILE,
            CalibrationError::InvalidThresholds { .. } => {
                CalibrationErrorCodes::INVALID_THRESHOLDS
            }
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::UnknownProfile { name } => {
                format!("Unknown calibration profile: '{}'", name)
            }
            CalibrationError::InvalidThresholds { reason } => {
                format!("Invalid thresholds: {}", reason)
            }
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CalibrationError {}
