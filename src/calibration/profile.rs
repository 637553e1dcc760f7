// Threshold profiles for blink timing classification
//
// A profile bundles the five timing thresholds that drive the pipeline:
// the short/long blink duration ranges and the symbol/word gap boundaries.
// Two presets ship with the system (slow, medium); user-supplied thresholds
// are carried under the reserved "custom" profile name.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// Reserved profile name for user-supplied thresholds
pub const CUSTOM_PROFILE_NAME: &str = "custom";

/// Name of the preset the store starts on and resets to
pub const DEFAULT_PROFILE_NAME: &str = "medium";

/// Timing thresholds in milliseconds
///
/// Invariants (enforced by `validate`):
/// - every field is positive
/// - `short_max_ms < long_min_ms <= long_max_ms` (the short and long blink
///   ranges never overlap)
/// - `symbol_gap_max_ms < word_gap_min_ms`
///
/// A blink duration between `short_max_ms` and `long_min_ms`, or above
/// `long_max_ms`, is outside both ranges and produces no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Maximum duration of a short blink
    pub short_max_ms: u32,
    /// Minimum duration of a long blink
    pub long_min_ms: u32,
    /// Maximum duration of a long blink
    pub long_max_ms: u32,
    /// Maximum pause between two blinks of the same word
    pub symbol_gap_max_ms: u32,
    /// Minimum idle period that completes a word
    pub word_gap_min_ms: u32,
}

impl Thresholds {
    /// Validate positivity and ordering of every field
    ///
    /// # Returns
    /// * `Ok(())` - Thresholds satisfy the invariants
    /// * `Err(CalibrationError::InvalidThresholds)` - First violated rule
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let fields = [
            ("short_max_ms", self.short_max_ms),
            ("long_min_ms", self.long_min_ms),
            ("long_max_ms", self.long_max_ms),
            ("symbol_gap_max_ms", self.symbol_gap_max_ms),
            ("word_gap_min_ms", self.word_gap_min_ms),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(CalibrationError::InvalidThresholds {
                    reason: format!("{} must be positive", name),
                });
            }
        }

        if self.short_max_ms >= self.long_min_ms {
            return Err(CalibrationError::InvalidThresholds {
                reason: format!(
                    "short_max_ms ({}) must be below long_min_ms ({})",
                    self.short_max_ms, self.long_min_ms
                ),
            });
        }
        if self.long_min_ms > self.long_max_ms {
            return Err(CalibrationError::InvalidThresholds {
                reason: format!(
                    "long_min_ms ({}) must not exceed long_max_ms ({})",
                    self.long_min_ms, self.long_max_ms
                ),
            });
        }
        if self.symbol_gap_max_ms >= self.word_gap_min_ms {
            return Err(CalibrationError::InvalidThresholds {
                reason: format!(
                    "symbol_gap_max_ms ({}) must be below word_gap_min_ms ({})",
                    self.symbol_gap_max_ms, self.word_gap_min_ms
                ),
            });
        }

        Ok(())
    }
}

/// A named calibration profile with its timing thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub name: String,
    pub description: String,
    pub thresholds: Thresholds,
}

/// Built-in calibration presets
///
/// Values match the original deployment: `medium` is the standard timing
/// table, `slow` widens every window for users with slower blink patterns.
static PRESETS: Lazy<Vec<CalibrationProfile>> = Lazy::new(|| {
    vec![
        CalibrationProfile {
            name: "slow".to_string(),
            description: "For users with slower blink patterns".to_string(),
            thresholds: Thresholds {
                short_max_ms: 500,
                long_min_ms: 501,
                long_max_ms: 1200,
                symbol_gap_max_ms: 600,
                word_gap_min_ms: 1500,
            },
        },
        CalibrationProfile {
            name: "medium".to_string(),
            description: "Standard timing for typical users".to_string(),
            thresholds: Thresholds {
                short_max_ms: 350,
                long_min_ms: 351,
                long_max_ms: 900,
                symbol_gap_max_ms: 450,
                word_gap_min_ms: 1100,
            },
        },
    ]
});

/// All built-in presets, in definition order
pub fn presets() -> &'static [CalibrationProfile] {
    &PRESETS
}

/// Look up a preset by name
pub fn preset(name: &str) -> Option<&'static CalibrationProfile> {
    PRESETS.iter().find(|p| p.name == name)
}
