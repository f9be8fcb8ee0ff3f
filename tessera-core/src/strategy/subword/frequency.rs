//! Frequency-table subword strategy
//!
//! One pass over the input's words counts every substring of up to
//! `max_len` grapheme clusters. Each word is then cut greedily from the
//! left: at every position the candidate with the highest
//! `count * length` wins. Multi-cluster candidates below `min_frequency`
//! are never chosen, single clusters always are eligible.

use std::collections::HashMap;

use tracing::debug;

use super::{grapheme_bounds, split_words, PieceEnds};
use crate::error::Result;
use crate::identity::seeded_rank;
use crate::options::{FrequencyOptions, TieBreak};
use crate::strategy::word::word_segments;
use crate::strategy::{SegmentContext, Strategy, StrategyKind};
use crate::token::{Segment, TokenKind};

#[derive(Debug, Clone, Default)]
pub struct FrequencyStrategy {
    options: FrequencyOptions,
}

impl FrequencyStrategy {
    pub fn new(options: FrequencyOptions) -> Self {
        Self { options }
    }
}

impl Strategy for FrequencyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SubwordFrequency
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        let words = word_segments(text, ctx)?;
        let table = SubstringTable::build(text, &words, self.options.max_len, ctx)?;
        debug!(entries = table.counts.len(), "built substring table");

        let mut cache: HashMap<&str, PieceEnds> = HashMap::new();
        split_words(text, &words, ctx, |word, ends| {
            let cached = cache.entry(word).or_insert_with(|| {
                let mut pieces = PieceEnds::new();
                table.greedy_ends(word, &self.options, ctx.seed(), &mut pieces);
                pieces
            });
            ends.extend_from_slice(cached);
        })
    }
}

struct SubstringTable<'t> {
    counts: HashMap<&'t str, u64>,
}

impl<'t> SubstringTable<'t> {
    fn build(
        text: &'t str,
        words: &[Segment],
        max_len: usize,
        ctx: &SegmentContext<'_>,
    ) -> Result<Self> {
        let mut counts: HashMap<&'t str, u64> = HashMap::new();
        for seg in words {
            if !matches!(seg.kind, TokenKind::Word | TokenKind::Number) {
                continue;
            }
            ctx.checkpoint()?;
            let word = &text[seg.start..seg.end];
            let bounds = grapheme_bounds(word);
            let clusters = bounds.len() - 1;
            for i in 0..clusters {
                for j in (i + 1)..=clusters.min(i + max_len) {
                    *counts.entry(&word[bounds[i]..bounds[j]]).or_default() += 1;
                }
            }
        }
        Ok(Self { counts })
    }

    fn count(&self, piece: &str) -> u64 {
        self.counts.get(piece).copied().unwrap_or(0)
    }

    fn greedy_ends(&self, word: &str, options: &FrequencyOptions, seed: u64, ends: &mut PieceEnds) {
        let bounds = grapheme_bounds(word);
        let clusters = bounds.len() - 1;
        let mut i = 0;

        while i < clusters {
            // (score, length, rank) of the best candidate so far
            let mut best: Option<(u64, usize, u64)> = None;
            for len in 1..=options.max_len.min(clusters - i) {
                let piece = &word[bounds[i]..bounds[i + len]];
                let count = self.count(piece);
                if len > 1 && count < options.min_frequency {
                    continue;
                }
                let score = count * len as u64;
                let rank = match options.tie_break {
                    TieBreak::Canonical => 0,
                    TieBreak::Seeded => seeded_rank(seed, &[piece]),
                };
                let better = match best {
                    None => true,
                    Some((best_score, best_len, best_rank)) => {
                        score > best_score
                            || (score == best_score
                                && (rank < best_rank || (rank == best_rank && len > best_len)))
                    }
                };
                if better {
                    best = Some((score, len, rank));
                }
            }

            let len = best.map_or(1, |(_, len, _)| len);
            i += len;
            ends.push(bounds[i]);
        }
    }
}
