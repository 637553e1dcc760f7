// SequenceEngine - symbol accumulation and vocabulary matching
//
// Groups blink events into a candidate word using gap timing and resolves
// the finished sequence against the vocabulary. Evaluation runs on every
// sample tick, not only on ticks that produced a blink event, because the
// word-gap check must fire while the user produces no further blinks.
//
// Matching: exact pattern lookup first, then fuzzy matching with at most
// one single-symbol edit (Levenshtein distance <= 1 over {S, L}).
// Candidates rank by smallest distance, ties broken by vocabulary
// definition order.

use log::{debug, info, warn};

use crate::analysis::blink::{BlinkEvent, BlinkSymbol};
use crate::analysis::stats::TranslationStats;
use crate::calibration::Thresholds;
use crate::vocabulary::Vocabulary;

/// Maximum pending sequence length before forced finalization
///
/// The longest vocabulary pattern is three symbols; one extra symbol keeps
/// fuzzy deletion matches reachable without letting a runaway sequence grow
/// unbounded.
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 4;

/// Accumulates symbols into a candidate word and resolves it
///
/// Tracks exactly one active sequence. The Last Word slot holds the most
/// recent finalization result until the boundary consumes it with
/// `take_last_word`.
#[derive(Debug)]
pub struct SequenceEngine {
    vocabulary: Vocabulary,
    pending: Vec<BlinkSymbol>,
    last_symbol_end_ms: Option<f64>,
    last_word: String,
    max_sequence_length: usize,
    stats: TranslationStats,
}

impl SequenceEngine {
    /// Create an engine over the given vocabulary with the default
    /// maximum sequence length
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self::with_max_length(vocabulary, DEFAULT_MAX_SEQUENCE_LENGTH)
    }

    /// Create an engine with an explicit maximum sequence length
    pub fn with_max_length(vocabulary: Vocabulary, max_sequence_length: usize) -> Self {
        info!(
            "SequenceEngine initialized with {} vocabulary entries, max_sequence_length={}",
            vocabulary.len(),
            max_sequence_length
        );
        Self {
            vocabulary,
            pending: Vec::new(),
            last_symbol_end_ms: None,
            last_word: String::new(),
            max_sequence_length: max_sequence_length.max(1),
            stats: TranslationStats::new(),
        }
    }

    /// Append a classified blink to the pending sequence
    ///
    /// Reaching the maximum sequence length finalizes immediately; gaps up
    /// to `symbol_gap_max_ms` are ordinary adjacency within the same word,
    /// and the zone between the two gap thresholds leaves the sequence
    /// open (the word-gap check in `evaluate_gap` is what promotes a pause
    /// to a word boundary).
    pub fn push_event(&mut self, event: &BlinkEvent, thresholds: &Thresholds) {
        if let Some(last_end) = self.last_symbol_end_ms {
            let gap_ms = event.start_ms - last_end;
            if gap_ms >= f64::from(thresholds.symbol_gap_max_ms) {
                debug!(
                    "Gap of {:.0} ms before {} is past symbol_gap_max_ms ({}), sequence stays open",
                    gap_ms, event.symbol, thresholds.symbol_gap_max_ms
                );
            }
        }

        self.pending.push(event.symbol);
        self.last_symbol_end_ms = Some(event.end_ms);
        debug!(
            "Appended {} to sequence '{}' ({}/{})",
            event.symbol,
            BlinkSymbol::render_pattern(&self.pending),
            self.pending.len(),
            self.max_sequence_length
        );

        if self.pending.len() >= self.max_sequence_length {
            info!(
                "Sequence reached max length ({}), finalizing",
                self.max_sequence_length
            );
            self.finalize();
        }
    }

    /// Evaluate the idle gap at the current sample timestamp
    ///
    /// Finalizes the pending sequence once the pause since the last
    /// symbol's end reaches `word_gap_min_ms`. Runs on every tick.
    pub fn evaluate_gap(&mut self, timestamp_ms: f64, thresholds: &Thresholds) {
        if self.pending.is_empty() {
            return;
        }
        let Some(last_end) = self.last_symbol_end_ms else {
            return;
        };
        if timestamp_ms - last_end >= f64::from(thresholds.word_gap_min_ms) {
            debug!(
                "Word gap of {:.0} ms detected, finalizing sequence",
                timestamp_ms - last_end
            );
            self.finalize();
        }
    }

    /// Resolve the pending sequence and store the result in the Last Word
    /// slot (empty on no match). Always clears the sequence.
    pub fn finalize(&mut self) {
        if self.pending.is_empty() {
            debug!("finalize called with empty sequence, nothing to do");
            return;
        }

        let pattern = BlinkSymbol::render_pattern(&self.pending);

        let matched = self
            .vocabulary
            .lookup_exact(&self.pending)
            .map(|entry| {
                info!("Exact match: '{}' -> '{}'", pattern, entry.word);
                entry.word.clone()
            })
            .or_else(|| {
                self.fuzzy_match().map(|entry| {
                    info!("Fuzzy match: '{}' -> '{}'", pattern, entry.word);
                    entry.word.clone()
                })
            });

        match matched {
            Some(word) => {
                self.stats.record_resolved(&word);
                self.last_word = word;
            }
            None => {
                info!("No match for sequence '{}'", pattern);
                self.stats.record_unresolved();
                self.last_word.clear();
            }
        }

        self.pending.clear();
        self.last_symbol_end_ms = None;
    }

    /// Best vocabulary entry within one single-symbol edit of the pending
    /// sequence
    ///
    /// Ranking: smallest edit distance first, then definition order.
    fn fuzzy_match(&self) -> Option<&crate::vocabulary::VocabEntry> {
        self.vocabulary
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let distance = edit_distance(&self.pending, &entry.pattern);
                (distance <= 1).then_some((distance, index, entry))
            })
            .min_by_key(|(distance, index, _)| (*distance, *index))
            .map(|(_, _, entry)| entry)
    }

    /// Consume the Last Word slot, leaving it empty
    pub fn take_last_word(&mut self) -> String {
        std::mem::take(&mut self.last_word)
    }

    /// The most recent finalization result without consuming it
    pub fn last_word(&self) -> &str {
        &self.last_word
    }

    /// Symbols accumulated since the last finalize or reset
    pub fn current_sequence(&self) -> Vec<BlinkSymbol> {
        self.pending.clone()
    }

    /// Clear the pending sequence and the Last Word slot unconditionally
    pub fn reset(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                "Resetting with pending sequence '{}'",
                BlinkSymbol::render_pattern(&self.pending)
            );
        }
        self.pending.clear();
        self.last_symbol_end_ms = None;
        self.last_word.clear();
    }

    /// Translation counters since startup or the last stats reset
    pub fn stats(&self) -> &TranslationStats {
        &self.stats
    }

    /// Zero the translation counters
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

/// Levenshtein distance between two symbol sequences
///
/// Single-row dynamic programming; the alphabet is only {S, L} and the
/// sequences are at most a handful of symbols long.
fn edit_distance(a: &[BlinkSymbol], b: &[BlinkSymbol]) -> usize {
    if a.len().abs_diff(b.len()) > 1 {
        // Callers only care about distance <= 1; skip the DP entirely
        return 2;
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, &sa) in a.iter().enumerate() {
        let mut prev_diag = row[0];
        row[0] = i + 1;
        for (j, &sb) in b.iter().enumerate() {
            let substitution = prev_diag + usize::from(sa != sb);
            prev_diag = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(prev_diag + 1);
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::blink::BlinkSymbol::{Long, Short};
    use crate::vocabulary::VocabEntry;

    fn medium_thresholds() -> Thresholds {
        Thresholds {
            short_max_ms: 350,
            long_min_ms: 351,
            long_max_ms: 900,
            symbol_gap_max_ms: 450,
            word_gap_min_ms: 1100,
        }
    }

    fn event(symbol: BlinkSymbol, start_ms: f64, end_ms: f64) -> BlinkEvent {
        BlinkEvent {
            symbol,
            start_ms,
            end_ms,
            duration_ms: end_ms - start_ms,
        }
    }

    fn engine() -> SequenceEngine {
        SequenceEngine::new(Vocabulary::default())
    }

    /// Push symbols with tight gaps and finalize directly
    fn finalize_symbols(engine: &mut SequenceEngine, symbols: &[BlinkSymbol]) {
        let t = medium_thresholds();
        let mut clock = 0.0;
        for &s in symbols {
            engine.push_event(&event(s, clock, clock + 200.0), &t);
            clock += 500.0;
        }
        engine.finalize();
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance(&[Short, Short], &[Short, Short]), 0);
        assert_eq!(edit_distance(&[Short, Long], &[Short, Short]), 1);
        assert_eq!(edit_distance(&[Short, Short, Short, Short], &[Short, Short, Short]), 1);
        assert_eq!(edit_distance(&[Short], &[Short, Short]), 1);
        assert_eq!(edit_distance(&[Long, Long], &[Short, Short]), 2);
        assert_eq!(edit_distance(&[Short], &[Short, Short, Short]), 2);
        assert_eq!(edit_distance(&[], &[Short]), 1);
    }

    #[test]
    fn test_exact_match_yes() {
        let mut engine = engine();
        finalize_symbols(&mut engine, &[Short, Short]);
        assert_eq!(engine.take_last_word(), "yes");
        assert!(engine.current_sequence().is_empty());
    }

    #[test]
    fn test_exact_match_single_long() {
        let mut engine = engine();
        finalize_symbols(&mut engine, &[Long]);
        assert_eq!(engine.take_last_word(), "no");
    }

    #[test]
    fn test_fuzzy_match_deletion() {
        // S S S S is one deletion away from "light" (S S S)
        let mut engine = engine();
        finalize_symbols(&mut engine, &[Short, Short, Short, Short]);
        assert_eq!(engine.take_last_word(), "light");
    }

    #[test]
    fn test_fuzzy_match_ssll_resolves_to_pain() {
        // S S L L is distance 1 from both "pain" (S S L) and "temp" (S L L);
        // "pain" is defined first and wins the tie
        let mut engine = engine();
        finalize_symbols(&mut engine, &[Short, Short, Long, Long]);
        assert_eq!(engine.take_last_word(), "pain");
    }

    #[test]
    fn test_fuzzy_tie_breaks_by_definition_order() {
        let vocab = Vocabulary::new(vec![
            VocabEntry {
                word: "alpha".to_string(),
                pattern: vec![Short, Short],
            },
            VocabEntry {
                word: "beta".to_string(),
                pattern: vec![Short, Long, Long],
            },
        ]);
        // S L is distance 1 from both patterns; alpha is defined first
        let mut engine = SequenceEngine::new(vocab);
        let t = medium_thresholds();
        engine.push_event(&event(Short, 0.0, 200.0), &t);
        engine.push_event(&event(Long, 500.0, 1100.0), &t);
        engine.finalize();
        assert_eq!(engine.take_last_word(), "alpha");
    }

    #[test]
    fn test_smaller_distance_beats_definition_order() {
        let vocab = Vocabulary::new(vec![
            VocabEntry {
                word: "close".to_string(),
                pattern: vec![Short, Long],
            },
            VocabEntry {
                word: "exact".to_string(),
                pattern: vec![Short, Short],
            },
        ]);
        let mut engine = SequenceEngine::new(vocab);
        finalize_symbols(&mut engine, &[Short, Short]);
        assert_eq!(engine.take_last_word(), "exact");
    }

    #[test]
    fn test_no_match_leaves_slot_empty() {
        let mut engine = engine();
        // Resolve a word first, then fail to resolve: the slot must be
        // overwritten with the empty result
        finalize_symbols(&mut engine, &[Short, Short]);
        assert_eq!(engine.last_word(), "yes");

        finalize_symbols(&mut engine, &[Long, Long, Long, Long]);
        assert_eq!(engine.take_last_word(), "");
        assert_eq!(engine.stats().unresolved, 1);
    }

    #[test]
    fn test_word_gap_finalizes() {
        let mut engine = engine();
        let t = medium_thresholds();

        engine.push_event(&event(Short, 0.0, 200.0), &t);
        engine.push_event(&event(Short, 500.0, 700.0), &t);

        // Idle below the word gap keeps the sequence open
        engine.evaluate_gap(1700.0, &t);
        assert_eq!(engine.current_sequence().len(), 2);
        assert_eq!(engine.last_word(), "");

        // 700 + 1100 = 1800 reaches word_gap_min_ms
        engine.evaluate_gap(1800.0, &t);
        assert!(engine.current_sequence().is_empty());
        assert_eq!(engine.take_last_word(), "yes");
    }

    #[test]
    fn test_ambiguous_gap_zone_leaves_sequence_open() {
        let mut engine = engine();
        let t = medium_thresholds();

        engine.push_event(&event(Short, 0.0, 200.0), &t);
        // 800 ms of idle sits between symbol_gap_max_ms (450) and
        // word_gap_min_ms (1100): neither adjacency nor a word boundary
        engine.evaluate_gap(1000.0, &t);
        assert_eq!(engine.current_sequence().len(), 1);

        // A further blink still joins the same word
        engine.push_event(&event(Short, 1000.0, 1200.0), &t);
        engine.evaluate_gap(2300.0, &t);
        assert_eq!(engine.take_last_word(), "yes");
    }

    #[test]
    fn test_max_length_auto_finalizes() {
        let mut engine = engine();
        let t = medium_thresholds();

        let mut clock = 0.0;
        for _ in 0..4 {
            engine.push_event(&event(Short, clock, clock + 200.0), &t);
            clock += 500.0;
        }

        // Fourth append finalized without any idle period
        assert!(engine.current_sequence().is_empty());
        assert_eq!(engine.take_last_word(), "light");
    }

    #[test]
    fn test_reset_clears_sequence_and_slot() {
        let mut engine = engine();
        let t = medium_thresholds();

        finalize_symbols(&mut engine, &[Short, Short]);
        engine.push_event(&event(Long, 5000.0, 5600.0), &t);

        engine.reset();
        assert!(engine.current_sequence().is_empty());
        assert_eq!(engine.take_last_word(), "");
    }

    #[test]
    fn test_take_last_word_consumes() {
        let mut engine = engine();
        finalize_symbols(&mut engine, &[Short, Short]);
        assert_eq!(engine.take_last_word(), "yes");
        assert_eq!(engine.take_last_word(), "");
    }

    #[test]
    fn test_stats_track_outcomes() {
        let mut engine = engine();
        finalize_symbols(&mut engine, &[Short, Short]);
        finalize_symbols(&mut engine, &[Short, Short]);
        finalize_symbols(&mut engine, &[Long, Long, Long, Long]);

        let stats = engine.stats();
        assert_eq!(stats.total_finalized, 3);
        assert_eq!(stats.resolved, 2);
        assert_eq!(stats.unresolved, 1);
        assert_eq!(stats.word_frequency.get("yes"), Some(&2));

        engine.reset_stats();
        assert_eq!(engine.stats().total_finalized, 0);
    }

    #[test]
    fn test_finalize_empty_sequence_is_noop() {
        let mut engine = engine();
        engine.finalize();
        assert_eq!(engine.last_word(), "");
        assert_eq!(engine.stats().total_finalized, 0);
    }
}
