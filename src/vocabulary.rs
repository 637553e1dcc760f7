// Vocabulary - ordered pattern-to-word table
//
// The core consumes the vocabulary as an already-parsed, ordered mapping
// from blink pattern to word. Definition order matters: when two entries
// share a pattern, or when fuzzy matching produces a tie, the first-defined
// entry wins. A serde loader for the original `sequences_v1.json` shape is
// provided for boundary convenience; it falls back to the built-in default
// table on any read or parse failure.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::analysis::blink::BlinkSymbol;

/// One vocabulary entry: a word and the ordered symbol pattern that spells it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    pub word: String,
    pub pattern: Vec<BlinkSymbol>,
}

impl Serialize for VocabEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawEntry {
            word: self.word.clone(),
            pattern: BlinkSymbol::render_pattern(&self.pattern),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VocabEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEntry::deserialize(deserializer)?;
        let pattern = parse_pattern(&raw.pattern)
            .ok_or_else(|| D::Error::custom(format!("invalid pattern '{}'", raw.pattern)))?;
        Ok(VocabEntry {
            word: raw.word,
            pattern,
        })
    }
}

/// Wire shape of a vocabulary entry: pattern as a space-separated string
#[derive(Serialize, Deserialize)]
struct RawEntry {
    word: String,
    pattern: String,
}

/// Wire shape of a vocabulary file (`sequences_v1.json`); extra sections
/// such as `meta` are ignored
#[derive(Deserialize)]
struct RawVocabularyFile {
    vocab: Vec<VocabEntry>,
}

/// Parse a space-separated pattern string ("S S L") into symbols
///
/// Returns `None` if the string is empty or contains an unknown code.
pub fn parse_pattern(pattern: &str) -> Option<Vec<BlinkSymbol>> {
    let symbols: Option<Vec<BlinkSymbol>> =
        pattern.split_whitespace().map(BlinkSymbol::from_code).collect();
    match symbols {
        Some(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

/// Ordered pattern-to-word table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    entries: Vec<VocabEntry>,
}

impl Vocabulary {
    /// Create a vocabulary from pre-parsed entries, preserving order
    pub fn new(entries: Vec<VocabEntry>) -> Self {
        Self { entries }
    }

    /// Parse a vocabulary from the JSON file shape
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawVocabularyFile = serde_json::from_str(json)?;
        Ok(Self::new(raw.vocab))
    }

    /// Load a vocabulary from a JSON file, falling back to the default
    /// table on any read or parse failure
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(vocab) => {
                    info!(
                        "Loaded vocabulary with {} entries from {:?}",
                        vocab.len(),
                        path.as_ref()
                    );
                    vocab
                }
                Err(err) => {
                    warn!(
                        "Failed to parse vocabulary file {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read vocabulary file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Entries in definition order
    pub fn entries(&self) -> &[VocabEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First-defined entry whose pattern equals `pattern` exactly
    pub fn lookup_exact(&self, pattern: &[BlinkSymbol]) -> Option<&VocabEntry> {
        self.entries.iter().find(|e| e.pattern == pattern)
    }

    /// Length of the longest pattern in the table
    pub fn longest_pattern(&self) -> usize {
        self.entries.iter().map(|e| e.pattern.len()).max().unwrap_or(0)
    }
}

impl Default for Vocabulary {
    /// The original ten-word care vocabulary
    fn default() -> Self {
        let table = [
            ("yes", "S S"),
            ("no", "L"),
            ("thirsty", "S L"),
            ("hungry", "L S"),
            ("pain", "S S L"),
            ("tired", "L L"),
            ("light", "S S S"),
            ("temp", "S L L"),
            ("bored", "L S S"),
            ("feelings", "L L S"),
        ];
        let entries = table
            .iter()
            .map(|(word, pattern)| VocabEntry {
                word: (*word).to_string(),
                pattern: parse_pattern(pattern)
                    .expect("built-in vocabulary patterns must parse"),
            })
            .collect();
        Self::new(entries)
    }
}
