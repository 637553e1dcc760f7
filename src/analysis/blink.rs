// BlinkClassifier - stateful conversion of EAR samples into blink events
//
// This module implements the two-state machine that turns a continuous
// eye-aspect-ratio signal into discrete Short/Long blink events. Eyes count
// as closed while the EAR value sits below a fixed cutoff; the closed
// interval's duration is classified against the calibrated threshold
// snapshot the instant the eyes re-open.
//
// Signal smoothing is the eye tracker's job: samples that do not cross the
// cutoff in either direction cause no state change and no event.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::calibration::Thresholds;
use crate::error::PipelineError;

/// Fixed EAR cutoff below which the eyes count as closed
///
/// Independent of calibration: the timing profiles tune durations and gaps,
/// not the openness boundary itself.
pub const DEFAULT_EAR_CLOSE_THRESHOLD: f64 = 0.25;

/// The two discrete symbols produced by duration-based blink classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlinkSymbol {
    /// Blink with duration at or below `short_max_ms`
    Short,
    /// Blink with duration within `[long_min_ms, long_max_ms]`
    Long,
}

impl BlinkSymbol {
    /// Single-letter code used in vocabulary patterns
    pub fn code(&self) -> &'static str {
        match self {
            BlinkSymbol::Short => "S",
            BlinkSymbol::Long => "L",
        }
    }

    /// Parse a single-letter pattern code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(BlinkSymbol::Short),
            "L" => Some(BlinkSymbol::Long),
            _ => None,
        }
    }

    /// Render a symbol slice as a space-separated pattern string ("S S L")
    pub fn render_pattern(symbols: &[BlinkSymbol]) -> String {
        symbols
            .iter()
            .map(|s| s.code())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for BlinkSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A classified blink, created the instant the eyes re-open
///
/// Immutable once created; consumed exactly once by the sequence engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinkEvent {
    /// Short or Long classification
    pub symbol: BlinkSymbol,
    /// Timestamp at which the eyes closed
    pub start_ms: f64,
    /// Timestamp at which the eyes re-opened
    pub end_ms: f64,
    /// Closed-eye interval length (`end_ms - start_ms`)
    pub duration_ms: f64,
}

/// Eye state tracked between samples
#[derive(Debug, Clone, Copy, PartialEq)]
enum EyeState {
    Open,
    Closed { since_ms: f64 },
}

/// Stateful per-sample blink classifier
///
/// Thresholds are passed in per call so that every classification decision
/// uses the store's current snapshot; the classifier itself never caches
/// calibration state.
#[derive(Debug)]
pub struct BlinkClassifier {
    ear_close_threshold: f64,
    state: EyeState,
    last_timestamp_ms: Option<f64>,
}

impl BlinkClassifier {
    /// Create a classifier with the given eye-closed EAR cutoff
    pub fn new(ear_close_threshold: f64) -> Self {
        Self {
            ear_close_threshold,
            state: EyeState::Open,
            last_timestamp_ms: None,
        }
    }

    /// Process a single EAR sample
    ///
    /// # Arguments
    /// * `timestamp_ms` - Monotonic sample timestamp in milliseconds
    /// * `ear_value` - Eye-aspect-ratio measurement for this sample
    /// * `thresholds` - Current calibration snapshot
    ///
    /// # Returns
    /// * `Ok(Some(BlinkEvent))` - Eyes re-opened and the closed interval
    ///   classified as a Short or Long blink
    /// * `Ok(None)` - No state transition, or a duration outside both blink
    ///   ranges (dropped as noise, logged)
    /// * `Err(PipelineError::NonMonotonicSample)` - Timestamp not greater
    ///   than the previously accepted one; sample dropped, state unchanged
    pub fn process_sample(
        &mut self,
        timestamp_ms: f64,
        ear_value: f64,
        thresholds: &Thresholds,
    ) -> Result<Option<BlinkEvent>, PipelineError> {
        if let Some(previous_ms) = self.last_timestamp_ms {
            if timestamp_ms <= previous_ms {
                return Err(PipelineError::NonMonotonicSample {
                    previous_ms,
                    received_ms: timestamp_ms,
                });
            }
        }
        self.last_timestamp_ms = Some(timestamp_ms);

        match self.state {
            EyeState::Open => {
                if ear_value < self.ear_close_threshold {
                    self.state = EyeState::Closed {
                        since_ms: timestamp_ms,
                    };
                }
                Ok(None)
            }
            EyeState::Closed { since_ms } => {
                if ear_value < self.ear_close_threshold {
                    return Ok(None);
                }
                self.state = EyeState::Open;

                let duration_ms = timestamp_ms - since_ms;
                let symbol = if duration_ms <= f64::from(thresholds.short_max_ms) {
                    BlinkSymbol::Short
                } else if duration_ms >= f64::from(thresholds.long_min_ms)
                    && duration_ms <= f64::from(thresholds.long_max_ms)
                {
                    BlinkSymbol::Long
                } else {
                    debug!(
                        "Blink of {:.0} ms outside short (<= {}) and long ({}..={}) ranges, dropped as noise",
                        duration_ms,
                        thresholds.short_max_ms,
                        thresholds.long_min_ms,
                        thresholds.long_max_ms
                    );
                    return Ok(None);
                };

                debug!(
                    "Blink classified as {} ({:.0} ms, {:.0}..{:.0})",
                    symbol, duration_ms, since_ms, timestamp_ms
                );
                Ok(Some(BlinkEvent {
                    symbol,
                    start_ms: since_ms,
                    end_ms: timestamp_ms,
                    duration_ms,
                }))
            }
        }
    }

    /// Whether the eyes currently count as closed
    pub fn is_blinking(&self) -> bool {
        matches!(self.state, EyeState::Closed { .. })
    }

    /// Return to the initial open state and forget the last timestamp
    pub fn reset(&mut self) {
        self.state = EyeState::Open;
        self.last_timestamp_ms = None;
    }
}
