//! Tokenization requests

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tessera_core::{StrategyKind, StrategyOptions, DEFAULT_SEED};

use crate::error::{EngineError, Result};

/// One input, the strategies to run over it, and how to run them
///
/// The input is shared read-only between all workers.
#[derive(Clone)]
pub struct TokenizationRequest {
    input: Arc<[u8]>,
    strategies: BTreeSet<StrategyKind>,
    seed: u64,
    options: StrategyOptions,
}

impl fmt::Debug for TokenizationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizationRequest")
            .field("input", &format!("<{} bytes>", self.input.len()))
            .field("strategies", &self.strategies)
            .field("seed", &self.seed)
            .field("options", &self.options)
            .finish()
    }
}

impl TokenizationRequest {
    /// Start a request over raw bytes
    pub fn builder(input: impl Into<Arc<[u8]>>) -> TokenizationRequestBuilder {
        TokenizationRequestBuilder::new(input.into())
    }

    /// Start a request over text
    pub fn from_text(text: &str) -> TokenizationRequestBuilder {
        Self::builder(text.as_bytes())
    }

    /// Start a request over bytes that may not be UTF-8
    pub fn from_bytes(bytes: Vec<u8>) -> TokenizationRequestBuilder {
        Self::builder(bytes)
    }

    /// The shared input
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Requested strategies, in canonical order
    pub fn strategies(&self) -> &BTreeSet<StrategyKind> {
        &self.strategies
    }

    /// Seed for every strategy in this request
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Strategy options for this request
    pub fn options(&self) -> &StrategyOptions {
        &self.options
    }
}

/// Builder for [`TokenizationRequest`]; options are validated in `build`
#[derive(Debug)]
pub struct TokenizationRequestBuilder {
    input: Arc<[u8]>,
    strategies: BTreeSet<StrategyKind>,
    seed: Option<u64>,
    options: Option<StrategyOptions>,
}

impl TokenizationRequestBuilder {
    fn new(input: Arc<[u8]>) -> Self {
        Self {
            input,
            strategies: BTreeSet::new(),
            seed: None,
            options: None,
        }
    }

    /// Add one strategy
    pub fn strategy(mut self, kind: StrategyKind) -> Self {
        self.strategies.insert(kind);
        self
    }

    /// Add several strategies; duplicates collapse
    pub fn strategies(mut self, kinds: impl IntoIterator<Item = StrategyKind>) -> Self {
        self.strategies.extend(kinds);
        self
    }

    /// Request all nine strategies
    pub fn all_strategies(self) -> Self {
        self.strategies(StrategyKind::ALL)
    }

    /// Set the seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the strategy options
    pub fn options(mut self, options: StrategyOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Validate and build the request
    pub fn build(self) -> Result<TokenizationRequest> {
        if self.strategies.is_empty() {
            return Err(EngineError::InvalidRequest(
                "at least one strategy must be requested".into(),
            ));
        }

        let options = self.options.unwrap_or_default();
        options
            .validate()
            .map_err(|e| EngineError::InvalidRequest(e.to_string()))?;

        Ok(TokenizationRequest {
            input: self.input,
            strategies: self.strategies,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = TokenizationRequest::from_text("hi")
            .strategy(StrategyKind::Word)
            .build()
            .unwrap();
        assert_eq!(request.input(), b"hi");
        assert_eq!(request.seed(), DEFAULT_SEED);
        assert_eq!(request.options(), &StrategyOptions::default());
    }

    #[test]
    fn test_strategies_are_deduplicated_and_ordered() {
        let request = TokenizationRequest::from_text("hi")
            .strategies([StrategyKind::Byte, StrategyKind::Space, StrategyKind::Byte])
            .build()
            .unwrap();
        let kinds: Vec<StrategyKind> = request.strategies().iter().copied().collect();
        assert_eq!(kinds, vec![StrategyKind::Space, StrategyKind::Byte]);
    }

    #[test]
    fn test_empty_strategy_set_rejected() {
        let result = TokenizationRequest::from_text("hi").build();
        assert!(matches!(result, Err(EngineError::InvalidRequest(_))));
    }

    #[test]
    fn test_invalid_options_rejected_at_build() {
        let mut options = StrategyOptions::default();
        options.subword_bpe.min_frequency = 0;
        let result = TokenizationRequest::from_bytes(vec![0xFF])
            .all_strategies()
            .options(options)
            .build();
        assert!(matches!(result, Err(EngineError::InvalidRequest(msg)) if msg.contains("subword_bpe")));
    }

    #[test]
    fn test_debug_hides_input() {
        let request = TokenizationRequest::from_text("secret")
            .strategy(StrategyKind::Char)
            .build()
            .unwrap();
        let debug = format!("{request:?}");
        assert!(debug.contains("<6 bytes>"));
        assert!(!debug.contains("secret"));
    }
}
