//! Engine error types
//!
//! [`EngineError`] covers everything that keeps a request from running at
//! all. Failures of an individual strategy never surface as an
//! `EngineError`; they are recorded as a [`StrategyError`] in that
//! strategy's result slot.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tessera_core::{CoreError, ReconstructionMismatch, VerifyError};
use thiserror::Error;

/// Configuration, pool and request construction errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Request failed validation
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// Configuration file could not be read
    #[error("failed to read config file {path:?}: {source}")]
    ConfigIo {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for [`crate::EngineConfig`]
    #[error("failed to parse config: {0}")]
    ConfigParse(String),
}

/// Failure recorded in a single strategy's slot
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum StrategyError {
    /// Input is not valid UTF-8 and the strategy needs text
    #[error("malformed input: invalid UTF-8 after byte {valid_up_to}")]
    MalformedInput {
        /// Length of the longest valid UTF-8 prefix
        valid_up_to: usize,
    },

    /// The request was cancelled before this strategy finished
    #[error("cancelled")]
    Cancelled,

    /// Round-trip verification found a difference
    #[error(transparent)]
    Mismatch(ReconstructionMismatch),

    /// The produced stream failed validation
    #[error("corrupt stream at token {index}: {reason}")]
    CorruptStream {
        /// Offending token index
        index: usize,
        /// Violated invariant
        reason: String,
    },

    /// Strategy options were rejected
    #[error("invalid options: {reason}")]
    InvalidOptions {
        /// Why the options were rejected
        reason: String,
    },

    /// The strategy panicked; siblings were unaffected
    #[error("strategy panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string
        message: String,
    },
}

impl StrategyError {
    /// Whether this slot failed because of cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StrategyError::Cancelled)
    }
}

impl From<CoreError> for StrategyError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedInput { valid_up_to } => StrategyError::MalformedInput { valid_up_to },
            CoreError::Cancelled => StrategyError::Cancelled,
            CoreError::CorruptStream { index, reason } => {
                StrategyError::CorruptStream { index, reason }
            }
            invalid @ CoreError::InvalidOptions { .. } => StrategyError::InvalidOptions {
                reason: invalid.to_string(),
            },
        }
    }
}

impl From<VerifyError> for StrategyError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Core(core) => core.into(),
            VerifyError::Mismatch(mismatch) => StrategyError::Mismatch(mismatch),
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
