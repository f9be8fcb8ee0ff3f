//! Core error types (deterministic only)

use thiserror::Error;

/// Core errors raised by segmentation and reconstruction
///
/// None of these carry I/O or scheduling failures; the core never touches
/// either.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Input bytes are not valid UTF-8 and the strategy needs text
    #[error("malformed input: invalid UTF-8 after byte {valid_up_to}")]
    MalformedInput {
        /// Length of the longest valid UTF-8 prefix
        valid_up_to: usize,
    },

    /// A stream handed to reconstruction violates its invariants
    #[error("corrupt stream at token {index}: {reason}")]
    CorruptStream {
        /// Index of the offending token (stream length for stream-level faults)
        index: usize,
        /// Which invariant was violated
        reason: String,
    },

    /// Cancellation was observed at an iteration boundary
    #[error("tokenization cancelled")]
    Cancelled,

    /// Strategy options failed validation
    #[error("invalid options for {strategy}: {reason}")]
    InvalidOptions {
        /// Strategy name the options belong to
        strategy: &'static str,
        /// Why the options were rejected
        reason: String,
    },
}

impl CoreError {
    pub(crate) fn corrupt(index: usize, reason: impl Into<String>) -> Self {
        CoreError::CorruptStream {
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_options(strategy: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidOptions {
            strategy,
            reason: reason.into(),
        }
    }
}

impl From<std::str::Utf8Error> for CoreError {
    fn from(err: std::str::Utf8Error) -> Self {
        CoreError::MalformedInput {
            valid_up_to: err.valid_up_to(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
