//! Character strategy: one token per codepoint (or grapheme cluster)

use unicode_segmentation::UnicodeSegmentation;

use super::{SegmentContext, Strategy, StrategyKind};
use crate::error::Result;
use crate::options::{CharOptions, CharUnit};
use crate::token::{Segment, TokenKind};

#[derive(Debug, Clone, Default)]
pub struct CharStrategy {
    options: CharOptions,
}

impl CharStrategy {
    pub fn new(options: CharOptions) -> Self {
        Self { options }
    }
}

impl Strategy for CharStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Char
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        let mut segments = Vec::with_capacity(text.len());
        match self.options.unit {
            CharUnit::Codepoint => {
                for (offset, ch) in text.char_indices() {
                    ctx.checkpoint()?;
                    segments.push(Segment::new(
                        offset,
                        offset + ch.len_utf8(),
                        TokenKind::Character,
                    ));
                }
            }
            CharUnit::Grapheme => {
                for (offset, grapheme) in text.grapheme_indices(true) {
                    ctx.checkpoint()?;
                    segments.push(Segment::new(
                        offset,
                        offset + grapheme.len(),
                        TokenKind::Character,
                    ));
                }
            }
        }
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;

    fn split(text: &str, unit: CharUnit) -> Vec<&str> {
        let cancel = CancelToken::new();
        let ctx = SegmentContext::new(0, &cancel);
        CharStrategy::new(CharOptions { unit })
            .segment(text, &ctx)
            .unwrap()
            .iter()
            .map(|s| &text[s.start..s.end])
            .collect()
    }

    #[test]
    fn test_codepoints_with_combining_accent_and_emoji() {
        let text = "cafe\u{301} \u{1F389}";
        assert_eq!(
            split(text, CharUnit::Codepoint),
            vec!["c", "a", "f", "e", "\u{301}", " ", "\u{1F389}"]
        );
    }

    #[test]
    fn test_graphemes_keep_clusters() {
        let text = "cafe\u{301} \u{1F389}";
        assert_eq!(
            split(text, CharUnit::Grapheme),
            vec!["c", "a", "f", "e\u{301}", " ", "\u{1F389}"]
        );
    }
}
