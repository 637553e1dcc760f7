// BlinkTalk Core - blink-to-word translation pipeline
// Converts eye-aspect-ratio samples into discrete symbols and words

// Module declarations
pub mod analysis;
pub mod calibration;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod vocabulary;

// Re-exports for convenience
pub use analysis::{BlinkClassifier, BlinkEvent, BlinkSymbol, SequenceEngine, TranslationStats};
pub use calibration::{CalibrationProfile, CalibrationStore, Thresholds};
pub use config::AppConfig;
pub use error::{CalibrationError, ErrorCode, PipelineError};
pub use pipeline::BlinkPipeline;
pub use vocabulary::{VocabEntry, Vocabulary};

/// Initialize env_logger for binaries and tests
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
