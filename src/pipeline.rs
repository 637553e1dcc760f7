// BlinkPipeline - the boundary-facing facade over the whole core
//
// Wires the calibration store, blink classifier and sequence engine
// together behind a single mutual-exclusion domain. Each sample tick
// (read thresholds, classify, append, evaluate gap, maybe finalize) runs
// atomically with respect to concurrent calibration switches and resets:
// the classifier and sequence state share one Mutex, while the
// calibration store keeps its own finer-grained lock because its reads
// return copies.
//
// Scheduling is synchronous and request-triggered; nothing here blocks on
// I/O or awaits an external event.

use std::sync::{Arc, Mutex, MutexGuard};

use log::info;

use crate::analysis::blink::{BlinkClassifier, BlinkEvent, BlinkSymbol};
use crate::analysis::sequence::SequenceEngine;
use crate::analysis::stats::TranslationStats;
use crate::calibration::{CalibrationStore, Thresholds};
use crate::config::AppConfig;
use crate::error::{log_pipeline_error, CalibrationError, PipelineError};
use crate::vocabulary::Vocabulary;

/// Classifier and sequence state guarded by one Mutex
struct PipelineState {
    classifier: BlinkClassifier,
    sequence: SequenceEngine,
}

/// The signal-to-symbol-to-word pipeline
///
/// Tracks exactly one active sequence. All state is in-memory and resets
/// with the process; named-profile persistence belongs to the boundary.
pub struct BlinkPipeline {
    calibration: Arc<CalibrationStore>,
    state: Mutex<PipelineState>,
}

impl BlinkPipeline {
    /// Create a pipeline over the given vocabulary with default
    /// configuration
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self::with_config(&AppConfig::default(), vocabulary)
    }

    /// Create a pipeline from an explicit configuration
    pub fn with_config(config: &AppConfig, vocabulary: Vocabulary) -> Self {
        let calibration = Arc::new(CalibrationStore::with_profile(&config.default_profile));
        info!(
            "BlinkPipeline initialized: profile='{}', ear_close_threshold={}, vocabulary={} entries",
            calibration.active_profile(),
            config.ear_close_threshold,
            vocabulary.len()
        );
        Self {
            calibration,
            state: Mutex::new(PipelineState {
                classifier: BlinkClassifier::new(config.ear_close_threshold),
                sequence: SequenceEngine::with_max_length(
                    vocabulary,
                    config.max_sequence_length,
                ),
            }),
        }
    }

    /// Shared handle to the calibration store
    pub fn calibration(&self) -> Arc<CalibrationStore> {
        Arc::clone(&self.calibration)
    }

    /// Process one EAR sample end-to-end
    ///
    /// Reads the calibration snapshot once, classifies the sample, appends
    /// any resulting symbol and evaluates the word gap, all under the state
    /// lock.
    ///
    /// # Arguments
    /// * `timestamp_ms` - Monotonic sample timestamp in milliseconds
    /// * `ear_value` - Eye-aspect-ratio measurement
    ///
    /// # Returns
    /// * `Ok(Some(BlinkEvent))` - This sample completed a blink
    /// * `Ok(None)` - No blink completed this tick
    /// * `Err(PipelineError::NonMonotonicSample)` - Sample dropped, all
    ///   state retained
    pub fn ingest_sample(
        &self,
        timestamp_ms: f64,
        ear_value: f64,
    ) -> Result<Option<BlinkEvent>, PipelineError> {
        let thresholds = self.calibration.get_thresholds();
        let mut state = self.lock_state()?;

        let event = state
            .classifier
            .process_sample(timestamp_ms, ear_value, &thresholds)
            .inspect_err(|err| log_pipeline_error(err, "ingest_sample"))?;

        if let Some(event) = &event {
            state.sequence.push_event(event, &thresholds);
        }
        state.sequence.evaluate_gap(timestamp_ms, &thresholds);

        Ok(event)
    }

    /// Switch the active calibration profile to a named preset
    pub fn set_profile(&self, name: &str) -> Result<Thresholds, CalibrationError> {
        self.calibration.set_profile(name)
    }

    /// Install custom thresholds
    pub fn set_custom(&self, thresholds: Thresholds) -> Result<Thresholds, CalibrationError> {
        self.calibration.set_custom(thresholds)
    }

    /// Consume the Last Word slot (empty string if none)
    pub fn take_last_word(&self) -> Result<String, PipelineError> {
        let mut state = self.lock_state()?;
        Ok(state.sequence.take_last_word())
    }

    /// Clear the pending sequence and the Last Word slot
    ///
    /// Does not touch the classifier's open/closed eye state; a blink in
    /// progress completes normally into the fresh sequence.
    pub fn reset_sequence(&self) -> Result<(), PipelineError> {
        let mut state = self.lock_state()?;
        state.sequence.reset();
        info!("Sequence state reset");
        Ok(())
    }

    /// Clear sequence-level state and the classifier's eye state
    pub fn reset_all(&self) -> Result<(), PipelineError> {
        let mut state = self.lock_state()?;
        state.sequence.reset();
        state.classifier.reset();
        info!("Sequence and classifier state reset");
        Ok(())
    }

    /// Symbols accumulated since the last finalize or reset
    pub fn current_sequence(&self) -> Result<Vec<BlinkSymbol>, PipelineError> {
        let state = self.lock_state()?;
        Ok(state.sequence.current_sequence())
    }

    /// Snapshot of the translation counters
    pub fn stats(&self) -> Result<TranslationStats, PipelineError> {
        let state = self.lock_state()?;
        Ok(state.sequence.stats().clone())
    }

    /// Zero the translation counters
    pub fn reset_stats(&self) -> Result<(), PipelineError> {
        let mut state = self.lock_state()?;
        state.sequence.reset_stats();
        Ok(())
    }

    /// Safely acquire the state lock
    ///
    /// Returns `StatePoisoned` instead of panicking when a previous holder
    /// panicked mid-tick; sequence state may be mid-word in that case, so
    /// recovery is left to the caller (typically `reset_sequence`).
    fn lock_state(&self) -> Result<MutexGuard<'_, PipelineState>, PipelineError> {
        self.state.lock().map_err(|_| {
            let err = PipelineError::StatePoisoned {
                component: "pipeline_state".to_string(),
            };
            log_pipeline_error(&err, "lock_state");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> BlinkPipeline {
        BlinkPipeline::new(Vocabulary::default())
    }

    /// Feed a blink of the given duration: one closing sample, one
    /// re-opening sample
    fn feed_blink(pipeline: &BlinkPipeline, start_ms: f64, duration_ms: f64) -> Option<BlinkEvent> {
        pipeline.ingest_sample(start_ms, 0.10).unwrap();
        pipeline
            .ingest_sample(start_ms + duration_ms, 0.30)
            .unwrap()
    }

    /// Feed eyes-open samples every 50 ms across an idle period
    fn feed_idle(pipeline: &BlinkPipeline, from_ms: f64, until_ms: f64) {
        let mut t = from_ms + 50.0;
        while t <= until_ms {
            pipeline.ingest_sample(t, 0.30).unwrap();
            t += 50.0;
        }
    }

    #[test]
    fn test_single_short_blink_event() {
        let pipeline = pipeline();
        let event = feed_blink(&pipeline, 0.0, 200.0).expect("short blink should emit event");
        assert_eq!(event.symbol, BlinkSymbol::Short);
        assert_eq!(pipeline.current_sequence().unwrap(), vec![BlinkSymbol::Short]);
    }

    #[test]
    fn test_yes_scenario() {
        // medium profile: 200 ms Short, 300 ms gap, 200 ms Short, 1200 ms idle
        let pipeline = pipeline();
        feed_blink(&pipeline, 0.0, 200.0);
        feed_blink(&pipeline, 500.0, 200.0);
        feed_idle(&pipeline, 700.0, 1900.0);

        assert_eq!(pipeline.take_last_word().unwrap(), "yes");
        assert!(pipeline.current_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_no_scenario() {
        // medium profile: single 600 ms Long, then 1200 ms idle
        let pipeline = pipeline();
        feed_blink(&pipeline, 0.0, 600.0);
        feed_idle(&pipeline, 600.0, 1800.0);

        assert_eq!(pipeline.take_last_word().unwrap(), "no");
    }

    #[test]
    fn test_profile_switch_changes_classification() {
        // 400 ms is Long under medium (short_max=350) but Short under slow
        // (short_max=500)
        let pipeline = pipeline();

        let event = feed_blink(&pipeline, 0.0, 400.0).unwrap();
        assert_eq!(event.symbol, BlinkSymbol::Long);

        pipeline.set_profile("slow").unwrap();
        let event = feed_blink(&pipeline, 2000.0, 400.0).unwrap();
        assert_eq!(event.symbol, BlinkSymbol::Short);
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let pipeline = pipeline();
        let before = pipeline.calibration().get_thresholds();

        assert!(matches!(
            pipeline.set_profile("fast"),
            Err(CalibrationError::UnknownProfile { .. })
        ));
        assert_eq!(pipeline.calibration().get_thresholds(), before);
    }

    #[test]
    fn test_non_monotonic_sample_dropped() {
        let pipeline = pipeline();
        pipeline.ingest_sample(100.0, 0.30).unwrap();

        assert!(matches!(
            pipeline.ingest_sample(100.0, 0.10),
            Err(PipelineError::NonMonotonicSample { .. })
        ));

        // Pipeline keeps working after the rejection
        let event = feed_blink(&pipeline, 200.0, 200.0).unwrap();
        assert_eq!(event.symbol, BlinkSymbol::Short);
    }

    #[test]
    fn test_reset_sequence_clears_pending_and_slot() {
        let pipeline = pipeline();
        // Finalize "yes" into the slot, then start a new pending sequence
        feed_blink(&pipeline, 0.0, 200.0);
        feed_blink(&pipeline, 500.0, 200.0);
        feed_idle(&pipeline, 700.0, 1900.0);
        feed_blink(&pipeline, 3000.0, 200.0);
        assert_eq!(pipeline.current_sequence().unwrap().len(), 1);

        pipeline.reset_sequence().unwrap();
        assert!(pipeline.current_sequence().unwrap().is_empty());
        assert_eq!(pipeline.take_last_word().unwrap(), "");
    }

    #[test]
    fn test_reset_sequence_mid_blink_preserves_eye_state() {
        let pipeline = pipeline();
        // Eyes closed at t=0, reset while the blink is in flight
        pipeline.ingest_sample(0.0, 0.10).unwrap();
        pipeline.reset_sequence().unwrap();

        // The blink still completes into a fresh sequence
        let event = pipeline.ingest_sample(200.0, 0.30).unwrap().unwrap();
        assert_eq!(event.symbol, BlinkSymbol::Short);
        assert_eq!(pipeline.current_sequence().unwrap(), vec![BlinkSymbol::Short]);
    }

    #[test]
    fn test_stats_snapshot() {
        let pipeline = pipeline();
        feed_blink(&pipeline, 0.0, 600.0);
        feed_idle(&pipeline, 600.0, 1800.0);
        assert_eq!(pipeline.take_last_word().unwrap(), "no");

        let stats = pipeline.stats().unwrap();
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.word_frequency.get("no"), Some(&1));

        pipeline.reset_stats().unwrap();
        assert_eq!(pipeline.stats().unwrap().total_finalized, 0);
    }
}
