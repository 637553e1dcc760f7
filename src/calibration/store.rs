// CalibrationStore - thread-safe owner of the active threshold profile
//
// Single source of truth for the timing thresholds used by the classifier
// and the sequence engine. Readers always receive an immutable copy, never
// a live reference, so a snapshot taken by one operation cannot change
// underneath it when a concurrent profile switch lands. Writers take the
// exclusive section only for the duration of validation-and-swap.

use std::sync::RwLock;

use log::{info, warn};

use crate::calibration::profile::{
    preset, presets, Thresholds, CUSTOM_PROFILE_NAME, DEFAULT_PROFILE_NAME,
};
use crate::error::{log_calibration_error, CalibrationError};

struct StoreState {
    active_profile: String,
    thresholds: Thresholds,
}

/// Thread-safe store for the active calibration profile
///
/// Mutated only by validated set operations; a rejected mutation leaves the
/// previous state untouched. A poisoned lock is recovered rather than
/// propagated: writers validate before swapping, so the stored state is
/// structurally valid even if a panicking thread held the guard.
pub struct CalibrationStore {
    state: RwLock<StoreState>,
}

impl Default for CalibrationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationStore {
    /// Create a store initialized to the default preset (medium)
    pub fn new() -> Self {
        let default = preset(DEFAULT_PROFILE_NAME)
            .expect("default preset must exist in the preset table");
        Self {
            state: RwLock::new(StoreState {
                active_profile: default.name.clone(),
                thresholds: default.thresholds,
            }),
        }
    }

    /// Create a store initialized to a named preset, falling back to the
    /// default with a warning when the name is unknown
    ///
    /// Mirrors the original system's startup behavior: a bad configured
    /// profile name must not prevent the pipeline from coming up.
    pub fn with_profile(name: &str) -> Self {
        let store = Self::new();
        if let Err(err) = store.set_profile(name) {
            warn!(
                "Invalid startup profile '{}' ({}), using '{}'",
                name,
                err,
                DEFAULT_PROFILE_NAME
            );
        }
        store
    }

    /// Switch to a named preset
    ///
    /// # Arguments
    /// * `name` - Preset name ("slow", "medium")
    ///
    /// # Returns
    /// * `Ok(Thresholds)` - Snapshot of the newly active thresholds
    /// * `Err(CalibrationError::UnknownProfile)` - Name is not a preset;
    ///   previous state retained
    pub fn set_profile(&self, name: &str) -> Result<Thresholds, CalibrationError> {
        let profile = preset(name).ok_or_else(|| {
            let err = CalibrationError::UnknownProfile {
                name: name.to_string(),
            };
            log_calibration_error(&err, "set_profile");
            err
        })?;

        let mut state = self.write_state();
        let old_profile = std::mem::replace(&mut state.active_profile, profile.name.clone());
        state.thresholds = profile.thresholds;
        info!(
            "Calibration profile changed from '{}' to '{}'",
            old_profile, profile.name
        );
        Ok(profile.thresholds)
    }

    /// Install user-supplied thresholds under the reserved "custom" name
    ///
    /// # Returns
    /// * `Ok(Thresholds)` - Snapshot of the newly active thresholds
    /// * `Err(CalibrationError::InvalidThresholds)` - Ordering or positivity
    ///   invariant violated; previous state retained
    pub fn set_custom(&self, thresholds: Thresholds) -> Result<Thresholds, CalibrationError> {
        thresholds.validate().inspect_err(|err| {
            log_calibration_error(err, "set_custom");
        })?;

        let mut state = self.write_state();
        state.active_profile = CUSTOM_PROFILE_NAME.to_string();
        state.thresholds = thresholds;
        info!("Calibration profile set to custom thresholds: {:?}", thresholds);
        Ok(thresholds)
    }

    /// Get an immutable copy of the current thresholds
    ///
    /// Never blocks callers behind classification work and never exposes a
    /// half-written state: writers hold the lock only for validation-and-swap.
    pub fn get_thresholds(&self) -> Thresholds {
        self.read_state().thresholds
    }

    /// Name of the currently active profile
    pub fn active_profile(&self) -> String {
        self.read_state().active_profile.clone()
    }

    /// Available preset names with their descriptions, in definition order
    pub fn available_profiles(&self) -> Vec<(String, String)> {
        presets()
            .iter()
            .map(|p| (p.name.clone(), p.description.clone()))
            .collect()
    }

    /// Reset to the default preset (medium)
    pub fn reset_to_default(&self) {
        // The default preset always exists, so this cannot fail.
        let _ = self.set_profile(DEFAULT_PROFILE_NAME);
        info!("Reset to default calibration profile: {}", DEFAULT_PROFILE_NAME);
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("Calibration state lock poisoned on read, recovering");
            poisoned.into_inner()
        })
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("Calibration state lock poisoned on write, recovering");
            poisoned.into_inner()
        })
    }
}
