//! Per-strategy configuration
//!
//! Each configurable strategy has its own options struct with explicit
//! defaults. All of them are validated together through
//! [`StrategyOptions::validate`] before any segmentation runs.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default configuration constants
pub mod defaults {
    /// Fixed subword chunk length in grapheme clusters
    pub const CHUNK_LEN: usize = 3;

    /// Upper bound on BPE merges learned per input
    pub const MAX_MERGES: usize = 64;

    /// Minimum weighted pair count for a BPE merge
    pub const BPE_MIN_FREQUENCY: u64 = 1;

    /// Longest substring (in grapheme clusters) the frequency table records
    pub const FREQUENCY_MAX_LEN: usize = 4;

    /// Minimum count for a multi-grapheme frequency candidate
    pub const FREQUENCY_MIN_FREQUENCY: u64 = 2;

    /// Hard cap on `FrequencyOptions::max_len`
    pub const FREQUENCY_MAX_LEN_LIMIT: usize = 32;

    /// Coordinating conjunctions recognised by the grammar strategy
    pub const CONJUNCTIONS: &[&str] = &["and", "but", "or", "nor", "for", "yet", "so"];
}

/// How equal-score candidates are ordered in learned subword strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// BPE: lexicographically smallest `(left, right)` pair.
    /// Frequency: the longer candidate.
    #[default]
    Canonical,
    /// Ties ordered by a seeded mix of the candidate text, falling back to
    /// the canonical order if the mix itself ties
    Seeded,
}

/// Unit emitted by the character strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharUnit {
    /// One token per Unicode scalar value
    #[default]
    Codepoint,
    /// One token per extended grapheme cluster
    Grapheme,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CharOptions {
    pub unit: CharUnit,
}

/// Grammar strategy options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrammarOptions {
    /// Words that get a conjunction marker in front of them (matched
    /// case-insensitively)
    pub conjunctions: Vec<String>,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            conjunctions: defaults::CONJUNCTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl GrammarOptions {
    pub fn validate(&self) -> Result<()> {
        for word in &self.conjunctions {
            if word.is_empty() || !word.chars().all(char::is_alphanumeric) {
                return Err(CoreError::invalid_options(
                    "grammar",
                    format!("conjunction {word:?} must be a non-empty alphanumeric word"),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn is_conjunction(&self, word: &str) -> bool {
        let lowered = word.to_lowercase();
        self.conjunctions
            .iter()
            .any(|c| c.to_lowercase() == lowered)
    }
}

/// Fixed-length subword options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixedOptions {
    /// Piece length in grapheme clusters
    pub chunk_len: usize,
}

impl Default for FixedOptions {
    fn default() -> Self {
        Self {
            chunk_len: defaults::CHUNK_LEN,
        }
    }
}

impl FixedOptions {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_len == 0 {
            return Err(CoreError::invalid_options(
                "subword_fixed",
                "chunk_len must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// BPE-style subword options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BpeOptions {
    /// Stop after this many merges
    pub max_merges: usize,
    /// Stop once base symbols plus merges reach this size
    pub vocab_size: Option<usize>,
    /// Pairs seen fewer times than this are never merged
    pub min_frequency: u64,
    pub tie_break: TieBreak,
}

impl Default for BpeOptions {
    fn default() -> Self {
        Self {
            max_merges: defaults::MAX_MERGES,
            vocab_size: None,
            min_frequency: defaults::BPE_MIN_FREQUENCY,
            tie_break: TieBreak::Canonical,
        }
    }
}

impl BpeOptions {
    /// Options with a merge budget and everything else default
    pub fn with_merges(max_merges: usize) -> Self {
        Self {
            max_merges,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_frequency == 0 {
            return Err(CoreError::invalid_options(
                "subword_bpe",
                "min_frequency must be at least 1",
            ));
        }
        if self.vocab_size == Some(0) {
            return Err(CoreError::invalid_options(
                "subword_bpe",
                "vocab_size must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Syllable subword options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyllableOptions {
    /// Treat `y` as a vowel when it does not start the word
    pub y_as_vowel: bool,
}

impl Default for SyllableOptions {
    fn default() -> Self {
        Self { y_as_vowel: true }
    }
}

/// Frequency-table subword options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrequencyOptions {
    /// Longest recorded substring, in grapheme clusters
    pub max_len: usize,
    /// Minimum count for candidates longer than one grapheme cluster
    pub min_frequency: u64,
    pub tie_break: TieBreak,
}

impl Default for FrequencyOptions {
    fn default() -> Self {
        Self {
            max_len: defaults::FREQUENCY_MAX_LEN,
            min_frequency: defaults::FREQUENCY_MIN_FREQUENCY,
            tie_break: TieBreak::Canonical,
        }
    }
}

impl FrequencyOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_len == 0 || self.max_len > defaults::FREQUENCY_MAX_LEN_LIMIT {
            return Err(CoreError::invalid_options(
                "subword_frequency",
                format!(
                    "max_len must be between 1 and {}",
                    defaults::FREQUENCY_MAX_LEN_LIMIT
                ),
            ));
        }
        if self.min_frequency == 0 {
            return Err(CoreError::invalid_options(
                "subword_frequency",
                "min_frequency must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Feature derivation options
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureOptions {
    /// Rotates the frontend digit and perturbs the backend number, for
    /// consumers that reserve a bit in their embedding layout
    pub embedding_bit: bool,
}

/// Options for every strategy, keyed like the strategy names
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyOptions {
    #[serde(rename = "char")]
    pub character: CharOptions,
    pub grammar: GrammarOptions,
    pub subword_fixed: FixedOptions,
    pub subword_bpe: BpeOptions,
    pub subword_syllable: SyllableOptions,
    pub subword_frequency: FrequencyOptions,
    pub features: FeatureOptions,
}

impl StrategyOptions {
    /// Validate every strategy's options
    pub fn validate(&self) -> Result<()> {
        self.grammar.validate()?;
        self.subword_fixed.validate()?;
        self.subword_bpe.validate()?;
        self.subword_frequency.validate()?;
        Ok(())
    }
}
