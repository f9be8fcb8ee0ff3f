//! Segmentation strategies
//!
//! The set of strategies is closed: [`StrategyKind`] enumerates all nine and
//! [`AnyStrategy`] dispatches to the matching implementation. Every
//! implementation satisfies the same contract:
//!
//! - `segment` is a pure function of the input, the options and the seed;
//! - the returned segments are in input order and cover the input exactly
//!   once (boundary markers cover nothing);
//! - cancellation is polled at least once per emitted segment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::{CoreError, Result};
use crate::options::StrategyOptions;
use crate::token::Segment;

pub mod byte;
pub mod character;
pub mod grammar;
pub mod space;
pub mod subword;
pub mod word;

pub use byte::ByteStrategy;
pub use character::CharStrategy;
pub use grammar::GrammarStrategy;
pub use space::SpaceStrategy;
pub use subword::{
    BpeModel, BpeStrategy, FixedStrategy, FrequencyStrategy, SyllableStrategy,
};
pub use word::WordStrategy;

/// Identifier of one of the nine strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Space,
    Word,
    Char,
    Grammar,
    SubwordFixed,
    SubwordBpe,
    SubwordSyllable,
    SubwordFrequency,
    Byte,
}

impl StrategyKind {
    /// Every strategy, in canonical order
    pub const ALL: [StrategyKind; 9] = [
        StrategyKind::Space,
        StrategyKind::Word,
        StrategyKind::Char,
        StrategyKind::Grammar,
        StrategyKind::SubwordFixed,
        StrategyKind::SubwordBpe,
        StrategyKind::SubwordSyllable,
        StrategyKind::SubwordFrequency,
        StrategyKind::Byte,
    ];

    /// Stable name, part of every uid
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Space => "space",
            StrategyKind::Word => "word",
            StrategyKind::Char => "char",
            StrategyKind::Grammar => "grammar",
            StrategyKind::SubwordFixed => "subword_fixed",
            StrategyKind::SubwordBpe => "subword_bpe",
            StrategyKind::SubwordSyllable => "subword_syllable",
            StrategyKind::SubwordFrequency => "subword_frequency",
            StrategyKind::Byte => "byte",
        }
    }

    /// Whether the strategy only accepts valid UTF-8
    pub fn requires_utf8(&self) -> bool {
        !matches!(self, StrategyKind::Byte)
    }

    /// Whether the strategy is one of the four subword variants
    pub fn is_subword(&self) -> bool {
        matches!(
            self,
            StrategyKind::SubwordFixed
                | StrategyKind::SubwordBpe
                | StrategyKind::SubwordSyllable
                | StrategyKind::SubwordFrequency
        )
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        StrategyKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CoreError::invalid_options("strategy", format!("unknown strategy {s:?}")))
    }
}

/// Per-call state handed to a strategy
#[derive(Debug, Clone, Copy)]
pub struct SegmentContext<'a> {
    seed: u64,
    cancel: &'a CancelToken,
}

impl<'a> SegmentContext<'a> {
    pub fn new(seed: u64, cancel: &'a CancelToken) -> Self {
        Self { seed, cancel }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fails with `Cancelled` once the caller has cancelled
    #[inline]
    pub fn checkpoint(&self) -> Result<()> {
        self.cancel.checkpoint()
    }
}

/// Segmentation contract shared by all strategies
pub trait Strategy: Send + Sync {
    /// Which strategy this is
    fn kind(&self) -> StrategyKind;

    /// Segment valid text
    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>>;

    /// Segment raw input; text strategies reject invalid UTF-8 here
    fn segment_bytes(&self, input: &[u8], ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        let text = std::str::from_utf8(input)?;
        self.segment(text, ctx)
    }
}

/// Closed dispatch over the nine implementations
#[derive(Debug, Clone)]
pub enum AnyStrategy {
    Space(SpaceStrategy),
    Word(WordStrategy),
    Char(CharStrategy),
    Grammar(GrammarStrategy),
    SubwordFixed(FixedStrategy),
    SubwordBpe(BpeStrategy),
    SubwordSyllable(SyllableStrategy),
    SubwordFrequency(FrequencyStrategy),
    Byte(ByteStrategy),
}

impl AnyStrategy {
    /// Instantiate `kind` with its slice of `options`
    pub fn new(kind: StrategyKind, options: &StrategyOptions) -> Self {
        match kind {
            StrategyKind::Space => AnyStrategy::Space(SpaceStrategy),
            StrategyKind::Word => AnyStrategy::Word(WordStrategy),
            StrategyKind::Char => AnyStrategy::Char(CharStrategy::new(options.character.clone())),
            StrategyKind::Grammar => {
                AnyStrategy::Grammar(GrammarStrategy::new(options.grammar.clone()))
            }
            StrategyKind::SubwordFixed => {
                AnyStrategy::SubwordFixed(FixedStrategy::new(options.subword_fixed.clone()))
            }
            StrategyKind::SubwordBpe => {
                AnyStrategy::SubwordBpe(BpeStrategy::new(options.subword_bpe.clone()))
            }
            StrategyKind::SubwordSyllable => AnyStrategy::SubwordSyllable(SyllableStrategy::new(
                options.subword_syllable.clone(),
            )),
            StrategyKind::SubwordFrequency => AnyStrategy::SubwordFrequency(
                FrequencyStrategy::new(options.subword_frequency.clone()),
            ),
            StrategyKind::Byte => AnyStrategy::Byte(ByteStrategy),
        }
    }

    fn inner(&self) -> &dyn Strategy {
        match self {
            AnyStrategy::Space(s) => s,
            AnyStrategy::Word(s) => s,
            AnyStrategy::Char(s) => s,
            AnyStrategy::Grammar(s) => s,
            AnyStrategy::SubwordFixed(s) => s,
            AnyStrategy::SubwordBpe(s) => s,
            AnyStrategy::SubwordSyllable(s) => s,
            AnyStrategy::SubwordFrequency(s) => s,
            AnyStrategy::Byte(s) => s,
        }
    }
}

impl Strategy for AnyStrategy {
    fn kind(&self) -> StrategyKind {
        self.inner().kind()
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        self.inner().segment(text, ctx)
    }

    fn segment_bytes(&self, input: &[u8], ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        self.inner().segment_bytes(input, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert!("sentencepiece".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_dispatch_reports_kind() {
        let options = StrategyOptions::default();
        for kind in StrategyKind::ALL {
            assert_eq!(AnyStrategy::new(kind, &options).kind(), kind);
        }
    }

    #[test]
    fn test_only_byte_accepts_invalid_utf8() {
        let options = StrategyOptions::default();
        let cancel = CancelToken::new();
        let ctx = SegmentContext::new(0, &cancel);
        let input = [b'a', 0xFF, b'b'];
        for kind in StrategyKind::ALL {
            let result = AnyStrategy::new(kind, &options).segment_bytes(&input, &ctx);
            if kind.requires_utf8() {
                assert_eq!(result, Err(CoreError::MalformedInput { valid_up_to: 1 }));
            } else {
                assert_eq!(result.unwrap().len(), 3);
            }
        }
    }

    #[test]
    fn test_serde_names_match() {
        let json = serde_json::to_string(&StrategyKind::SubwordBpe).unwrap();
        assert_eq!(json, "\"subword_bpe\"");
    }
}
