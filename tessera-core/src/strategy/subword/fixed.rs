//! Fixed-length subword strategy: every `chunk_len` grapheme clusters

use super::{grapheme_bounds, split_words};
use crate::error::Result;
use crate::options::FixedOptions;
use crate::strategy::word::word_segments;
use crate::strategy::{SegmentContext, Strategy, StrategyKind};
use crate::token::Segment;

#[derive(Debug, Clone, Default)]
pub struct FixedStrategy {
    options: FixedOptions,
}

impl FixedStrategy {
    pub fn new(options: FixedOptions) -> Self {
        Self { options }
    }
}

impl Strategy for FixedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SubwordFixed
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        let chunk = self.options.chunk_len.max(1);
        let words = word_segments(text, ctx)?;
        split_words(text, &words, ctx, |word, ends| {
            ends.extend(grapheme_bounds(word).into_iter().skip(chunk).step_by(chunk));
        })
    }
}
