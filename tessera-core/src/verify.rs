//! Round-trip verification with a byte-level diagnostic

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CoreError;
use crate::options::StrategyOptions;
use crate::reconstruct::concat_tokens;
use crate::strategy::StrategyKind;
use crate::token::TokenStream;
use crate::tokenizer::Tokenizer;

/// Bytes shown on each side of the first difference
const EXCERPT_RADIUS: usize = 8;

/// Where a reconstruction first departs from the original input
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error(
    "{strategy} reconstruction differs at byte {offset}: expected {expected:?}, got {actual:?} \
     ({expected_len} vs {actual_len} bytes)"
)]
pub struct ReconstructionMismatch {
    pub strategy: StrategyKind,
    /// First differing byte offset
    pub offset: usize,
    /// Original input around `offset` (lossy UTF-8)
    pub expected: String,
    /// Reconstruction around `offset` (lossy UTF-8)
    pub actual: String,
    pub expected_len: usize,
    pub actual_len: usize,
}

/// Verification failure: the stream was unusable, or it reconstructed to
/// different bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Mismatch(#[from] ReconstructionMismatch),
}

fn excerpt(bytes: &[u8], offset: usize) -> String {
    let end = offset.saturating_add(EXCERPT_RADIUS).min(bytes.len());
    let start = offset.saturating_sub(EXCERPT_RADIUS).min(end);
    String::from_utf8_lossy(&bytes[start..end]).into_owned()
}

/// Compare `actual` against `expected` byte for byte
pub fn compare(
    strategy: StrategyKind,
    expected: &[u8],
    actual: &[u8],
) -> Result<(), ReconstructionMismatch> {
    let offset = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())));

    match offset {
        None => Ok(()),
        Some(offset) => Err(ReconstructionMismatch {
            strategy,
            offset,
            expected: excerpt(expected, offset),
            actual: excerpt(actual, offset),
            expected_len: expected.len(),
            actual_len: actual.len(),
        }),
    }
}

/// Reconstruct `stream` and compare it against `original`
///
/// Skips the source hash check; a faulty stream reports the offset where it
/// diverges.
pub fn verify_stream(stream: &TokenStream, original: &[u8]) -> Result<(), VerifyError> {
    let actual = concat_tokens(stream)?;
    compare(stream.strategy(), original, &actual)?;
    Ok(())
}

/// Tokenize `input` with one strategy and check it reconstructs exactly
pub fn verify_round_trip(
    kind: StrategyKind,
    input: &[u8],
    options: &StrategyOptions,
    seed: u64,
) -> Result<(), VerifyError> {
    let stream = Tokenizer::with_options(seed, options.clone())?.tokenize(kind, input)?;
    verify_stream(&stream, input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_inputs_pass() {
        assert!(compare(StrategyKind::Word, b"same", b"same").is_ok());
        assert!(compare(StrategyKind::Word, b"", b"").is_ok());
    }

    #[test]
    fn test_first_difference_is_reported() {
        let err = compare(StrategyKind::Char, b"hello world", b"hello w0rld").unwrap_err();
        assert_eq!(err.offset, 7);
        assert_eq!(err.expected, "hello world");
        assert_eq!(err.actual, "hello w0rld");
        assert_eq!((err.expected_len, err.actual_len), (11, 11));
    }

    #[test]
    fn test_truncation_reports_end_of_shorter() {
        let err = compare(StrategyKind::Space, b"abc", b"ab").unwrap_err();
        assert_eq!(err.offset, 2);
        assert_eq!(err.actual, "ab");
        assert_eq!(err.actual_len, 2);
    }

    #[test]
    fn test_excerpt_is_windowed() {
        let expected = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut actual = expected.to_vec();
        actual[20] = b'_';
        let err = compare(StrategyKind::Byte, expected, &actual).unwrap_err();
        assert_eq!(err.expected, "cdefghijklmnopqr");
        assert_eq!(err.actual, "cdefghij_lmnopqr");
    }

    #[test]
    fn test_every_strategy_verifies() {
        let options = StrategyOptions::default();
        for kind in StrategyKind::ALL {
            verify_round_trip(kind, "So it goes, and goes.".as_bytes(), &options, 7).unwrap();
        }
    }

    #[test]
    fn test_malformed_input_is_a_core_error() {
        let result = verify_round_trip(
            StrategyKind::Word,
            &[0xC3],
            &StrategyOptions::default(),
            0,
        );
        assert_eq!(
            result,
            Err(VerifyError::Core(CoreError::MalformedInput { valid_up_to: 0 }))
        );
    }
}
