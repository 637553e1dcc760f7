//! Configuration management for pipeline tuning
//!
//! Runtime configuration loading from JSON files, enabling deployments to
//! adjust the eye-closed cutoff, startup profile and sequence length cap
//! without recompilation. Any read or parse failure falls back to the
//! defaults with a warning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::blink::DEFAULT_EAR_CLOSE_THRESHOLD;
use crate::analysis::sequence::DEFAULT_MAX_SEQUENCE_LENGTH;
use crate::calibration::DEFAULT_PROFILE_NAME;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// EAR value below which the eyes count as closed
    pub ear_close_threshold: f64,
    /// Calibration preset active at startup
    pub default_profile: String,
    /// Pending sequence length that forces finalization
    pub max_sequence_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ear_close_threshold: DEFAULT_EAR_CLOSE_THRESHOLD,
            default_profile: DEFAULT_PROFILE_NAME.to_string(),
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration, or the defaults if the file is missing or
    /// invalid (logged as a warning either way)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
