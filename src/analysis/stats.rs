// TranslationStats - observational counters for the translation boundary
//
// Tracks finalization outcomes and word frequency. Purely observational:
// nothing here feeds back into classification or matching. The pipeline's
// state mutex already guards access, so this is a plain owned struct.

use std::collections::HashMap;

use serde::Serialize;

/// Counters describing translation outcomes since the last reset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranslationStats {
    /// Sequences finalized, resolved or not
    pub total_finalized: u64,
    /// Finalizations that produced a word
    pub resolved: u64,
    /// Finalizations with no exact or fuzzy candidate
    pub unresolved: u64,
    /// Resolution count per word
    pub word_frequency: HashMap<String, u64>,
    /// Most recently resolved word
    pub last_resolved_word: Option<String>,
}

impl TranslationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finalization that resolved to `word`
    pub fn record_resolved(&mut self, word: &str) {
        self.total_finalized += 1;
        self.resolved += 1;
        *self.word_frequency.entry(word.to_string()).or_insert(0) += 1;
        self.last_resolved_word = Some(word.to_string());
    }

    /// Record a finalization with no matching vocabulary entry
    pub fn record_unresolved(&mut self) {
        self.total_finalized += 1;
        self.unresolved += 1;
    }

    /// Fraction of finalizations that resolved, in percent (0 when none)
    pub fn success_rate(&self) -> f64 {
        if self.total_finalized == 0 {
            return 0.0;
        }
        self.resolved as f64 / self.total_finalized as f64 * 100.0
    }

    /// The `n` most frequent words, most frequent first; ties broken
    /// alphabetically for a stable order
    pub fn top_words(&self, n: usize) -> Vec<(String, u64)> {
        let mut words: Vec<(String, u64)> = self
            .word_frequency
            .iter()
            .map(|(w, c)| (w.clone(), *c))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(n);
        words
    }

    /// Zero every counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
