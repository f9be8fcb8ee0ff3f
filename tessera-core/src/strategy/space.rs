//! Space strategy: alternating whitespace and non-whitespace runs

use super::{SegmentContext, Strategy, StrategyKind};
use crate::error::Result;
use crate::token::{Segment, TokenKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceStrategy;

impl Strategy for SpaceStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Space
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut run_start = 0;
        let mut run_is_space = None;

        for (offset, ch) in text.char_indices() {
            let is_space = ch.is_whitespace();
            match run_is_space {
                Some(current) if current == is_space => {}
                Some(current) => {
                    ctx.checkpoint()?;
                    segments.push(Segment::new(run_start, offset, run_kind(current)));
                    run_start = offset;
                    run_is_space = Some(is_space);
                }
                None => run_is_space = Some(is_space),
            }
        }

        if let Some(current) = run_is_space {
            ctx.checkpoint()?;
            segments.push(Segment::new(run_start, text.len(), run_kind(current)));
        }
        Ok(segments)
    }
}

fn run_kind(is_space: bool) -> TokenKind {
    if is_space {
        TokenKind::Whitespace
    } else {
        TokenKind::Word
    }
}
