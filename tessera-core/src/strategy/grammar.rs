//! Grammar strategy
//!
//! Word segmentation refined with light syntactic cues:
//!
//! - intra-word apostrophes and hyphens are joined (`don't`, `well-known`),
//!   as are digit groups (`3.14`, `1,000`);
//! - a zero-width [`BoundaryKind::SentenceEnd`] marker follows every run of
//!   sentence terminators, a [`BoundaryKind::ClauseEnd`] marker every run of
//!   clause punctuation;
//! - a [`BoundaryKind::Conjunction`] marker precedes every coordinating
//!   conjunction.
//!
//! Markers carry no text, so the remaining tokens still tile the input.

use super::word::word_segments;
use super::{SegmentContext, Strategy, StrategyKind};
use crate::error::Result;
use crate::options::GrammarOptions;
use crate::token::{BoundaryKind, Segment, TokenKind};

const SENTENCE_TERMINATORS: &[char] = &[
    '.', '!', '?', '\u{2026}', '\u{203C}', '\u{2047}', '\u{2048}', '\u{2049}', '\u{3002}',
    '\u{FF01}', '\u{FF1F}',
];

const CLAUSE_PUNCTUATION: &[char] = &[
    ',', ';', ':', '\u{2013}', '\u{2014}', '\u{3001}', '\u{FF0C}', '\u{FF1A}', '\u{FF1B}',
];

const WORD_JOINERS: &[&str] = &["'", "\u{2019}", "-", "\u{2010}"];

const DIGIT_JOINERS: &[&str] = &[".", ","];

#[derive(Debug, Clone, Default)]
pub struct GrammarStrategy {
    options: GrammarOptions,
}

impl GrammarStrategy {
    pub fn new(options: GrammarOptions) -> Self {
        Self { options }
    }
}

impl Strategy for GrammarStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Grammar
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        let words = word_segments(text, ctx)?;
        let joined = join_compounds(text, &words, ctx)?;
        insert_markers(text, &joined, &self.options, ctx)
    }
}

fn is_wordish(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Word | TokenKind::Number)
}

/// Merge `word JOINER word` and `number JOINER number` triples
fn join_compounds(text: &str, words: &[Segment], ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
    let mut out: Vec<Segment> = Vec::with_capacity(words.len());
    let mut i = 0;

    while i < words.len() {
        ctx.checkpoint()?;
        let seg = words[i];

        if seg.kind == TokenKind::Punctuation {
            if let (Some(prev), Some(next)) = (out.last_mut(), words.get(i + 1)) {
                let joiner = &text[seg.start..seg.end];
                let joined = if prev.kind == TokenKind::Number
                    && next.kind == TokenKind::Number
                    && DIGIT_JOINERS.contains(&joiner)
                {
                    Some(TokenKind::Number)
                } else if is_wordish(prev.kind)
                    && is_wordish(next.kind)
                    && WORD_JOINERS.contains(&joiner)
                {
                    Some(TokenKind::Word)
                } else {
                    None
                };

                if let Some(kind) = joined {
                    prev.end = next.end;
                    prev.kind = kind;
                    i += 2;
                    continue;
                }
            }
        }

        out.push(seg);
        i += 1;
    }
    Ok(out)
}

fn boundary_cue(text: &str, seg: &Segment) -> Option<BoundaryKind> {
    if seg.kind != TokenKind::Punctuation {
        return None;
    }
    let mut chars = text[seg.start..seg.end].chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if SENTENCE_TERMINATORS.contains(&ch) {
        Some(BoundaryKind::SentenceEnd)
    } else if CLAUSE_PUNCTUATION.contains(&ch) {
        Some(BoundaryKind::ClauseEnd)
    } else {
        None
    }
}

fn stronger(a: BoundaryKind, b: BoundaryKind) -> BoundaryKind {
    if a == BoundaryKind::SentenceEnd || b == BoundaryKind::SentenceEnd {
        BoundaryKind::SentenceEnd
    } else {
        BoundaryKind::ClauseEnd
    }
}

fn insert_markers(
    text: &str,
    segments: &[Segment],
    options: &GrammarOptions,
    ctx: &SegmentContext<'_>,
) -> Result<Vec<Segment>> {
    let mut out = Vec::with_capacity(segments.len() + segments.len() / 4);
    let mut pending: Option<BoundaryKind> = None;

    for (i, seg) in segments.iter().enumerate() {
        ctx.checkpoint()?;

        if seg.kind == TokenKind::Word && options.is_conjunction(&text[seg.start..seg.end]) {
            out.push(Segment::marker(seg.start, BoundaryKind::Conjunction));
        }
        out.push(*seg);

        if let Some(cue) = boundary_cue(text, seg) {
            pending = Some(pending.map_or(cue, |p| stronger(p, cue)));
            let run_continues = segments
                .get(i + 1)
                .is_some_and(|next| boundary_cue(text, next).is_some());
            if !run_continues {
                if let Some(kind) = pending.take() {
                    out.push(Segment::marker(seg.end, kind));
                }
            }
        }
    }
    Ok(out)
}
