//! Word strategy
//!
//! Classifies extended grapheme clusters as alphanumeric, whitespace or
//! other. Runs of alphanumerics and runs of whitespace each form one token;
//! every other grapheme is a token of its own. Classifying whole clusters
//! keeps combining marks and emoji sequences attached to their base.

use unicode_segmentation::UnicodeSegmentation;

use super::{SegmentContext, Strategy, StrategyKind};
use crate::error::Result;
use crate::token::{Segment, TokenKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct WordStrategy;

impl Strategy for WordStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Word
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        word_segments(text, ctx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Alnum,
    Space,
    Other,
}

fn classify(grapheme: &str) -> Class {
    match grapheme.chars().next() {
        Some(ch) if ch.is_whitespace() => Class::Space,
        Some(ch) if ch.is_alphanumeric() => Class::Alnum,
        _ => Class::Other,
    }
}

/// Punctuation as opposed to other symbols
///
/// Covers ASCII punctuation (excluding math and currency-like symbols),
/// Latin-1 punctuation, General Punctuation, CJK punctuation and the
/// full-width forms of ASCII punctuation.
pub(crate) fn is_punctuation(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_punctuation()
            && !matches!(ch, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~');
    }
    matches!(
        ch,
        '\u{00A1}'
            | '\u{00A7}'
            | '\u{00AB}'
            | '\u{00B6}'
            | '\u{00B7}'
            | '\u{00BB}'
            | '\u{00BF}'
            | '\u{2010}'..='\u{2027}'
            | '\u{2030}'..='\u{205E}'
            | '\u{3001}'..='\u{3003}'
            | '\u{3008}'..='\u{3011}'
            | '\u{3014}'..='\u{301F}'
            | '\u{FF01}'..='\u{FF03}'
            | '\u{FF05}'..='\u{FF0A}'
            | '\u{FF0C}'..='\u{FF0F}'
            | '\u{FF1A}'
            | '\u{FF1B}'
            | '\u{FF1F}'
            | '\u{FF20}'
    )
}

fn run_kind(text: &str, class: Class) -> TokenKind {
    match class {
        Class::Alnum if text.chars().all(char::is_numeric) => TokenKind::Number,
        Class::Alnum => TokenKind::Word,
        Class::Space => TokenKind::Whitespace,
        Class::Other => match text.chars().next() {
            Some(ch) if is_punctuation(ch) => TokenKind::Punctuation,
            _ => TokenKind::Symbol,
        },
    }
}

/// Word-level segmentation shared by the grammar and subword strategies
pub(crate) fn word_segments(text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut run: Option<(usize, Class)> = None;

    for (offset, grapheme) in text.grapheme_indices(true) {
        let class = classify(grapheme);
        if let Some((start, current)) = run {
            if current == class && class != Class::Other {
                continue;
            }
            ctx.checkpoint()?;
            segments.push(Segment::new(
                start,
                offset,
                run_kind(&text[start..offset], current),
            ));
        }
        run = Some((offset, class));
    }

    if let Some((start, current)) = run {
        ctx.checkpoint()?;
        segments.push(Segment::new(
            start,
            text.len(),
            run_kind(&text[start..], current),
        ));
    }
    Ok(segments)
}
