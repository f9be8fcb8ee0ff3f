//! Syllable-like subword strategy
//!
//! A vowel/consonant heuristic, not a dictionary hyphenator. Each grapheme
//! cluster is classified by its first codepoint; between two vowel groups
//! the word is split before the last consonant of the cluster separating
//! them (`syl-lab-le`, `beau-ti-ful`). Words with fewer than two vowel
//! groups stay whole.

use super::{grapheme_bounds, split_words, PieceEnds};
use crate::error::Result;
use crate::options::SyllableOptions;
use crate::strategy::word::word_segments;
use crate::strategy::{SegmentContext, Strategy, StrategyKind};
use crate::token::Segment;

#[derive(Debug, Clone, Default)]
pub struct SyllableStrategy {
    options: SyllableOptions,
}

impl SyllableStrategy {
    pub fn new(options: SyllableOptions) -> Self {
        Self { options }
    }
}

impl Strategy for SyllableStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SubwordSyllable
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        let words = word_segments(text, ctx)?;
        split_words(text, &words, ctx, |word, ends| {
            syllable_ends(word, &self.options, ends)
        })
    }
}

fn is_vowel(grapheme: &str, first: bool, options: &SyllableOptions) -> bool {
    let Some(ch) = grapheme.chars().next().and_then(|c| c.to_lowercase().next()) else {
        return false;
    };
    match ch {
        'a' | 'e' | 'i' | 'o' | 'u' => true,
        'y' => options.y_as_vowel && !first,
        '\u{00E0}'..='\u{00E6}'
        | '\u{00E8}'..='\u{00EF}'
        | '\u{00F2}'..='\u{00F6}'
        | '\u{00F8}'..='\u{00FC}'
        | '\u{0153}' => true,
        _ => false,
    }
}

fn syllable_ends(word: &str, options: &SyllableOptions, ends: &mut PieceEnds) {
    let bounds = grapheme_bounds(word);
    let vowels: Vec<bool> = bounds
        .windows(2)
        .enumerate()
        .map(|(i, w)| is_vowel(&word[w[0]..w[1]], i == 0, options))
        .collect();

    // index just past the previous vowel group, once one has been seen
    let mut after_group: Option<usize> = None;
    let mut i = 0;
    while i < vowels.len() {
        if !vowels[i] {
            i += 1;
            continue;
        }
        if let Some(prev_end) = after_group {
            if i > prev_end {
                ends.push(bounds[i - 1]);
            }
        }
        while i < vowels.len() && vowels[i] {
            i += 1;
        }
        after_group = Some(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;

    fn split(text: &str) -> Vec<&str> {
        let cancel = CancelToken::new();
        let ctx = SegmentContext::new(0, &cancel);
        SyllableStrategy::default()
            .segment(text, &ctx)
            .unwrap()
            .iter()
            .map(|s| &text[s.start..s.end])
            .collect()
    }

    #[test]
    fn test_common_words() {
        assert_eq!(split("syllable"), vec!["syl", "lab", "le"]);
        assert_eq!(split("beautiful"), vec!["beau", "ti", "ful"]);
        assert_eq!(split("banana"), vec!["ba", "na", "na"]);
    }

    #[test]
    fn test_single_vowel_group_stays_whole() {
        assert_eq!(split("strength and 2024"), vec!["strength", " ", "and", " ", "2024"]);
    }

    #[test]
    fn test_leading_y_is_consonant() {
        assert_eq!(split("ytterbium"), vec!["ytter", "bium"]);
        assert_eq!(split("gym"), vec!["gym"]);
    }

    #[test]
    fn test_accented_vowels() {
        assert_eq!(split("caf\u{e9}"), vec!["ca", "f\u{e9}"]);
    }
}
