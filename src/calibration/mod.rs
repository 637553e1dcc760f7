// Calibration - timing threshold profiles and the store that owns them
//
// Blink classification and gap evaluation are driven entirely by five
// millisecond thresholds. This module defines the threshold profile type,
// the built-in presets, and the thread-safe store the rest of the pipeline
// reads them from.

pub mod profile;
pub mod store;

pub use profile::{
    preset, presets, CalibrationProfile, Thresholds, CUSTOM_PROFILE_NAME, DEFAULT_PROFILE_NAME,
};
pub use store::CalibrationStore;
