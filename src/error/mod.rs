// Error types for the BlinkTalk core pipeline
//
// This module defines custom error types for calibration and sample
// processing operations, providing structured error handling with numeric
// error codes suitable for surfacing across an API boundary.

mod calibration;
mod pipeline;

pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};
pub use pipeline::{log_pipeline_error, PipelineError, PipelineErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling at the
/// transport boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
