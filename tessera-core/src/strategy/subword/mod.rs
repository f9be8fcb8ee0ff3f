//! Subword strategies
//!
//! All four variants start from word segmentation and only ever split
//! word and number segments; whitespace, punctuation and symbols pass
//! through unchanged. Splits always fall on extended grapheme cluster
//! boundaries, so a combining mark is never separated from its base.
//!
//! The first piece of a word is emitted as
//! `Piece { continuation: false }`, every further piece as
//! `Piece { continuation: true }`.

use smallvec::SmallVec;
use unicode_segmentation::UnicodeSegmentation;

use super::SegmentContext;
use crate::error::Result;
use crate::token::{Segment, TokenKind};

pub mod bpe;
pub mod fixed;
pub mod frequency;
pub mod syllable;

pub use bpe::{BpeModel, BpeStrategy};
pub use fixed::FixedStrategy;
pub use frequency::FrequencyStrategy;
pub use syllable::SyllableStrategy;

/// Piece end offsets within one word
pub(crate) type PieceEnds = SmallVec<[usize; 8]>;

/// Byte offsets of grapheme cluster boundaries in `word`, including 0 and
/// `word.len()`
pub(crate) fn grapheme_bounds(word: &str) -> SmallVec<[usize; 16]> {
    let mut bounds: SmallVec<[usize; 16]> = word.grapheme_indices(true).map(|(i, _)| i).collect();
    bounds.push(word.len());
    bounds
}

fn is_splittable(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Word | TokenKind::Number)
}

/// Expand word-level segments into pieces
///
/// `split` receives each word and pushes the end offset of every piece
/// except possibly the last. Offsets that do not advance, or that run past
/// the word, are ignored; the word always ends with a piece reaching its
/// last byte.
pub(crate) fn split_words<'t, F>(
    text: &'t str,
    words: &[Segment],
    ctx: &SegmentContext<'_>,
    mut split: F,
) -> Result<Vec<Segment>>
where
    F: FnMut(&'t str, &mut PieceEnds),
{
    let mut out = Vec::with_capacity(words.len() * 2);
    let mut ends = PieceEnds::new();

    for seg in words {
        if !is_splittable(seg.kind) {
            ctx.checkpoint()?;
            out.push(*seg);
            continue;
        }

        let word = &text[seg.start..seg.end];
        ends.clear();
        split(word, &mut ends);

        let mut start = 0;
        for end in ends.iter().copied().chain(std::iter::once(word.len())) {
            if end <= start || end > word.len() {
                continue;
            }
            ctx.checkpoint()?;
            out.push(Segment::new(
                seg.start + start,
                seg.start + end,
                TokenKind::Piece {
                    continuation: start > 0,
                },
            ));
            start = end;
        }
    }
    Ok(out)
}
