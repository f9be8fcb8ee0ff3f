//! Tokenization results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tessera_core::{StrategyKind, TokenStream};

use crate::error::StrategyError;

/// What one strategy produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyOutcome {
    /// The strategy ran to completion
    Completed(TokenStream),
    /// The strategy failed; siblings are unaffected
    Failed(StrategyError),
}

impl StrategyOutcome {
    /// The stream, if the strategy completed
    pub fn stream(&self) -> Option<&TokenStream> {
        match self {
            StrategyOutcome::Completed(stream) => Some(stream),
            StrategyOutcome::Failed(_) => None,
        }
    }

    /// The error, if the strategy failed
    pub fn error(&self) -> Option<&StrategyError> {
        match self {
            StrategyOutcome::Completed(_) => None,
            StrategyOutcome::Failed(err) => Some(err),
        }
    }

    /// Whether the strategy completed
    pub fn is_completed(&self) -> bool {
        matches!(self, StrategyOutcome::Completed(_))
    }

    /// Convert into a plain `Result`
    pub fn into_result(self) -> Result<TokenStream, StrategyError> {
        match self {
            StrategyOutcome::Completed(stream) => Ok(stream),
            StrategyOutcome::Failed(err) => Err(err),
        }
    }
}

impl From<Result<TokenStream, StrategyError>> for StrategyOutcome {
    fn from(result: Result<TokenStream, StrategyError>) -> Self {
        match result {
            Ok(stream) => StrategyOutcome::Completed(stream),
            Err(err) => StrategyOutcome::Failed(err),
        }
    }
}

/// Run statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Worker pool size
    pub workers: usize,
    /// Input length in bytes
    pub input_len: usize,
    /// Seed used for every strategy
    pub seed: u64,
    /// Number of strategies requested
    pub requested: usize,
    /// Strategies that completed
    pub succeeded: usize,
    /// Strategies that failed for reasons other than cancellation
    pub failed: usize,
    /// Strategies stopped by cancellation
    pub cancelled: usize,
    /// Whether the configured timeout fired
    pub timed_out: bool,
    /// Wall-clock time for the whole request
    pub elapsed_ms: u64,
}

/// Per-strategy outcomes of one request, keyed by strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizationResult {
    outcomes: BTreeMap<StrategyKind, StrategyOutcome>,
    metadata: RunMetadata,
}

impl TokenizationResult {
    pub(crate) fn new(
        outcomes: BTreeMap<StrategyKind, StrategyOutcome>,
        metadata: RunMetadata,
    ) -> Self {
        Self { outcomes, metadata }
    }

    /// Outcome for one strategy, if it was requested
    pub fn get(&self, kind: StrategyKind) -> Option<&StrategyOutcome> {
        self.outcomes.get(&kind)
    }

    /// Stream for one strategy, if it completed
    pub fn stream(&self, kind: StrategyKind) -> Option<&TokenStream> {
        self.get(kind).and_then(StrategyOutcome::stream)
    }

    /// Error for one strategy, if it failed
    pub fn error(&self, kind: StrategyKind) -> Option<&StrategyError> {
        self.get(kind).and_then(StrategyOutcome::error)
    }

    /// All outcomes in canonical strategy order
    pub fn outcomes(&self) -> &BTreeMap<StrategyKind, StrategyOutcome> {
        &self.outcomes
    }

    /// Iterate over `(strategy, outcome)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (StrategyKind, &StrategyOutcome)> {
        self.outcomes.iter().map(|(kind, outcome)| (*kind, outcome))
    }

    /// Run statistics
    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    /// Whether every requested strategy completed
    pub fn is_complete(&self) -> bool {
        self.outcomes.values().all(StrategyOutcome::is_completed)
    }

    /// Take ownership of the outcomes
    pub fn into_outcomes(self) -> BTreeMap<StrategyKind, StrategyOutcome> {
        self.outcomes
    }
}
