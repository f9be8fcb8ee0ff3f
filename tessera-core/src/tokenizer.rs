//! Single-threaded entry point

use std::collections::BTreeMap;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::identity::assign_identifiers;
use crate::options::StrategyOptions;
use crate::strategy::{AnyStrategy, SegmentContext, Strategy, StrategyKind};
use crate::token::TokenStream;
use crate::verify::{verify_stream, VerifyError};

/// Seed used when the caller does not choose one
pub const DEFAULT_SEED: u64 = 42;

/// Runs strategies over an input with a fixed seed and options
#[derive(Debug, Clone)]
pub struct Tokenizer {
    seed: u64,
    options: StrategyOptions,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Tokenizer {
    /// Tokenizer with default options
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            options: StrategyOptions::default(),
        }
    }

    /// Tokenizer with validated options
    pub fn with_options(seed: u64, options: StrategyOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { seed, options })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn options(&self) -> &StrategyOptions {
        &self.options
    }

    /// Tokenize `input` with one strategy
    pub fn tokenize(&self, kind: StrategyKind, input: &[u8]) -> Result<TokenStream> {
        self.tokenize_with_cancel(kind, input, &CancelToken::new())
    }

    /// Tokenize, stopping at the next checkpoint once `cancel` is set
    pub fn tokenize_with_cancel(
        &self,
        kind: StrategyKind,
        input: &[u8],
        cancel: &CancelToken,
    ) -> Result<TokenStream> {
        cancel.checkpoint()?;
        let strategy = AnyStrategy::new(kind, &self.options);
        let ctx = SegmentContext::new(self.seed, cancel);
        let segments = strategy.segment_bytes(input, &ctx)?;
        assign_identifiers(
            kind,
            self.seed,
            input,
            &segments,
            &self.options.features,
            cancel,
        )
    }

    pub fn tokenize_str(&self, kind: StrategyKind, text: &str) -> Result<TokenStream> {
        self.tokenize(kind, text.as_bytes())
    }

    /// Every strategy in turn; failures stay in their own entry
    pub fn tokenize_all(&self, input: &[u8]) -> BTreeMap<StrategyKind, Result<TokenStream>> {
        StrategyKind::ALL
            .iter()
            .map(|&kind| (kind, self.tokenize(kind, input)))
            .collect()
    }

    /// Tokenize and check the stream reconstructs to `input`
    pub fn verify(
        &self,
        kind: StrategyKind,
        input: &[u8],
    ) -> std::result::Result<TokenStream, VerifyError> {
        let stream = self.tokenize(kind, input)?;
        verify_stream(&stream, input)?;
        Ok(stream)
    }
}

/// Tokenize text with default options
pub fn tokenize_text(kind: StrategyKind, text: &str, seed: u64) -> Result<TokenStream> {
    Tokenizer::new(seed).tokenize_str(kind, text)
}
