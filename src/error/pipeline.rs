// Pipeline error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Pipeline error code constants exposed at the API boundary
///
/// Error code range: 1001-1002
pub struct PipelineErrorCodes {}

impl PipelineErrorCodes {
    /// Sample timestamp was not strictly greater than the previous one
    pub const NON_MONOTONIC_SAMPLE: i32 = 1001;

    /// Shared pipeline state Mutex was poisoned
    pub const STATE_POISONED: i32 = 1002;
}

/// Log a pipeline error with structured context
pub fn log_pipeline_error(err: &PipelineError, context: &str) {
    error!(
        "Pipeline error in {}: code={}, component=BlinkPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Sample-processing errors
///
/// These errors cover EAR sample ingestion. A rejected sample is dropped
/// and classifier state is retained; nothing here is fatal.
///
/// Error code range: 1001-1002
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Sample timestamp was not strictly greater than the previous one.
    /// The sample is dropped to protect duration arithmetic.
    NonMonotonicSample { previous_ms: f64, received_ms: f64 },

    /// Shared pipeline state Mutex was poisoned
    StatePoisoned { component: String },
}

impl ErrorCode for PipelineError {
    fn code(&self) -> i32 {
        match self {
            PipelineError::NonMonotonicSample { .. } => PipelineErrorCodes::NON_MONOTONIC_SAMPLE,
            PipelineError::StatePoisoned { .. } => PipelineErrorCodes::STATE_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            PipelineError::NonMonotonicSample {
                previous_ms,
                received_ms,
            } => {
                format!(
                    "Non-monotonic sample: received {:.3} ms after {:.3} ms",
                    received_ms, previous_ms
                )
            }
            PipelineError::StatePoisoned { component } => {
                format!("Pipeline state lock poisoned: {}", component)
            }
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PipelineError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PipelineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_codes() {
        assert_eq!(
            PipelineError::NonMonotonicSample {
                previous_ms: 100.0,
                received_ms: 50.0
            }
            .code(),
            PipelineErrorCodes::NON_MONOTONIC_SAMPLE
        );
        assert_eq!(
            PipelineError::StatePoisoned {
                component: "pipeline_state".to_string()
            }
            .code(),
            PipelineErrorCodes::STATE_POISONED
        );
    }

    #[test]
    fn test_pipeline_error_messages() {
        let err = PipelineError::NonMonotonicSample {
            previous_ms: 100.0,
            received_ms: 50.0,
        };
        assert!(err.message().contains("50.000"));
        assert!(err.message().contains("100.000"));

        let err = PipelineError::StatePoisoned {
            component: "pipeline_state".to_string(),
        };
        assert!(err.message().contains("poisoned"));
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::StatePoisoned {
            component: "pipeline_state".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("PipelineError"));
        assert!(display.contains("1002"));
    }
}
