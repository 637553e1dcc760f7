// Analysis - the signal-to-symbol-to-word stages of the pipeline
//
// blink: stateful EAR-sample to blink-event classification
// sequence: symbol accumulation, gap evaluation and vocabulary matching
// stats: observational counters for the translation boundary

pub mod blink;
pub mod sequence;
pub mod stats;

pub use blink::{BlinkClassifier, BlinkEvent, BlinkSymbol, DEFAULT_EAR_CLOSE_THRESHOLD};
pub use sequence::{SequenceEngine, DEFAULT_MAX_SEQUENCE_LENGTH};
pub use stats::TranslationStats;
