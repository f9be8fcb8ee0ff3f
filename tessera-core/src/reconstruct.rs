//! Stream validation and inversion
//!
//! A stream is checked against every structural invariant before it is
//! inverted, so a corrupted or tampered stream fails with
//! [`CoreError::CorruptStream`] instead of yielding wrong text.

use crate::error::{CoreError, Result};
use crate::identity::{compute_content_id, compute_uid};
use crate::strategy::byte::parse_byte;
use crate::strategy::StrategyKind;
use crate::token::{SourceHash, Token, TokenKind, TokenStream};

fn kind_allowed(strategy: StrategyKind, kind: TokenKind) -> bool {
    use TokenKind::*;

    match strategy {
        StrategyKind::Space => matches!(kind, Word | Whitespace),
        StrategyKind::Word => matches!(kind, Word | Number | Whitespace | Punctuation | Symbol),
        StrategyKind::Char => matches!(kind, Character),
        StrategyKind::Grammar => matches!(
            kind,
            Word | Number | Whitespace | Punctuation | Symbol | Boundary(_)
        ),
        StrategyKind::SubwordFixed
        | StrategyKind::SubwordBpe
        | StrategyKind::SubwordSyllable
        | StrategyKind::SubwordFrequency => {
            matches!(kind, Piece { .. } | Whitespace | Punctuation | Symbol)
        }
        StrategyKind::Byte => matches!(kind, Byte),
    }
}

fn check_text(index: usize, token: &Token) -> Result<()> {
    let width = token.end - token.start;
    match token.kind {
        TokenKind::Boundary(_) => {
            if !token.text.is_empty() || width != 0 {
                return Err(CoreError::corrupt(index, "marker must be empty and zero-width"));
            }
        }
        TokenKind::Byte => {
            if width != 1 || parse_byte(&token.text).is_none() {
                return Err(CoreError::corrupt(
                    index,
                    format!("invalid byte token {:?}", token.text),
                ));
            }
        }
        _ => {
            if token.text.is_empty() {
                return Err(CoreError::corrupt(index, "empty token"));
            }
            if token.text.len() != width {
                return Err(CoreError::corrupt(
                    index,
                    format!(
                        "text is {} bytes but offsets span {width}",
                        token.text.len()
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Check every structural invariant of `stream`
///
/// Offsets must tile `0..source_len` in index order, each token's kind must
/// belong to the stream's strategy, text must agree with offsets, subword
/// continuations must follow a piece, neighbor links must match, and every
/// identifier must match the token it belongs to.
pub fn validate_stream(stream: &TokenStream) -> Result<()> {
    let strategy = stream.strategy();
    let name = strategy.name();
    let tokens = stream.tokens();
    let mut cursor = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        if token.index != i {
            return Err(CoreError::corrupt(
                i,
                format!("token carries index {}", token.index),
            ));
        }
        if !kind_allowed(strategy, token.kind) {
            return Err(CoreError::corrupt(
                i,
                format!("{:?} token in a {name} stream", token.kind),
            ));
        }
        if token.start != cursor {
            return Err(CoreError::corrupt(
                i,
                format!("starts at {} but the previous token ended at {cursor}", token.start),
            ));
        }
        if token.end < token.start || token.end > stream.source_len() {
            return Err(CoreError::corrupt(
                i,
                format!("offsets {}..{} out of range", token.start, token.end),
            ));
        }
        check_text(i, token)?;

        if token.kind == (TokenKind::Piece { continuation: true }) {
            let follows_piece = i
                .checked_sub(1)
                .is_some_and(|p| matches!(tokens[p].kind, TokenKind::Piece { .. }));
            if !follows_piece {
                return Err(CoreError::corrupt(i, "continuation piece does not follow a piece"));
            }
        }

        let prev = i.checked_sub(1).map(|p| tokens[p].uid);
        let next = tokens.get(i + 1).map(|t| t.uid);
        if token.prev_uid != prev || token.next_uid != next {
            return Err(CoreError::corrupt(i, "neighbor links do not match"));
        }
        if token.uid != compute_uid(name, stream.seed(), i, &token.text) {
            return Err(CoreError::corrupt(i, "uid does not match token"));
        }
        if token.content_id != compute_content_id(&token.text) {
            return Err(CoreError::corrupt(i, "content id does not match text"));
        }

        cursor = token.end;
    }

    if cursor != stream.source_len() {
        return Err(CoreError::corrupt(
            tokens.len(),
            format!("tokens cover {cursor} of {} bytes", stream.source_len()),
        ));
    }
    Ok(())
}

/// Validated concatenation, without the source hash check
pub(crate) fn concat_tokens(stream: &TokenStream) -> Result<Vec<u8>> {
    validate_stream(stream)?;

    let mut out = Vec::with_capacity(stream.source_len());
    for (i, token) in stream.iter().enumerate() {
        match token.kind {
            TokenKind::Boundary(_) => {}
            TokenKind::Byte => {
                let byte = parse_byte(&token.text)
                    .ok_or_else(|| CoreError::corrupt(i, "invalid byte token"))?;
                out.push(byte);
            }
            _ => out.extend_from_slice(token.text.as_bytes()),
        }
    }
    Ok(out)
}

/// Exact input bytes a stream was produced from
pub fn reconstruct_bytes(stream: &TokenStream) -> Result<Vec<u8>> {
    let bytes = concat_tokens(stream)?;
    if SourceHash::of(&bytes) != *stream.source_hash() {
        return Err(CoreError::corrupt(
            stream.len(),
            "reconstructed bytes do not match the source hash",
        ));
    }
    Ok(bytes)
}

/// Exact input text a stream was produced from
///
/// Byte streams over non-UTF-8 input fail with `MalformedInput`; use
/// [`reconstruct_bytes`] for those.
pub fn reconstruct(stream: &TokenStream) -> Result<String> {
    let bytes = reconstruct_bytes(stream)?;
    String::from_utf8(bytes).map_err(|err| CoreError::from(err.utf8_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn stream(kind: StrategyKind, text: &str) -> TokenStream {
        Tokenizer::default().tokenize(kind, text.as_bytes()).unwrap()
    }

    fn tampered(stream: &TokenStream, edit: impl FnOnce(&mut Vec<Token>)) -> TokenStream {
        let mut tokens = stream.tokens().to_vec();
        edit(&mut tokens);
        TokenStream::from_parts(
            stream.strategy(),
            stream.seed(),
            stream.source_hash().clone(),
            stream.source_len(),
            tokens,
        )
    }

    fn corrupt_index(result: Result<String>) -> usize {
        match result {
            Err(CoreError::CorruptStream { index, .. }) => index,
            other => panic!("expected CorruptStream, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_every_strategy() {
        let text = "Well-known facts: 3.14 isn't \u{3c0}, and caf\u{e9} \u{1F389}!";
        for kind in StrategyKind::ALL {
            assert_eq!(reconstruct(&stream(kind, text)).unwrap(), text, "{kind}");
        }
    }

    #[test]
    fn test_byte_stream_of_invalid_utf8() {
        let input = [0x66, 0xFF, 0x6F];
        let stream = Tokenizer::default()
            .tokenize(StrategyKind::Byte, &input)
            .unwrap();
        assert_eq!(stream.texts(), vec!["f", "<0xFF>", "o"]);
        assert_eq!(reconstruct_bytes(&stream).unwrap(), input);
        assert_eq!(
            reconstruct(&stream),
            Err(CoreError::MalformedInput { valid_up_to: 1 })
        );
    }

    #[test]
    fn test_dropped_token_is_a_gap() {
        let original = stream(StrategyKind::Word, "one two");
        let broken = tampered(&original, |tokens| {
            tokens.remove(1);
        });
        // the index check fires first for the shifted token
        assert_eq!(corrupt_index(reconstruct(&broken)), 1);
    }

    #[test]
    fn test_edited_text_is_detected() {
        let original = stream(StrategyKind::Word, "one two");
        let broken = tampered(&original, |tokens| tokens[2].text = "tow".into());
        assert_eq!(corrupt_index(reconstruct(&broken)), 2);
    }

    #[test]
    fn test_truncated_stream_is_detected() {
        let original = stream(StrategyKind::Char, "abc");
        let broken = tampered(&original, |tokens| {
            tokens.pop();
            if let Some(last) = tokens.last_mut() {
                last.next_uid = None;
            }
        });
        assert_eq!(corrupt_index(reconstruct(&broken)), 2);
    }

    #[test]
    fn test_marker_outside_grammar_is_rejected() {
        let original = stream(StrategyKind::Word, "a");
        let broken = tampered(&original, |tokens| {
            tokens[0].kind = TokenKind::Boundary(crate::token::BoundaryKind::SentenceEnd);
        });
        assert_eq!(corrupt_index(reconstruct(&broken)), 0);
    }

    #[test]
    fn test_leading_continuation_is_rejected() {
        let original = stream(StrategyKind::SubwordFixed, "abcdef");
        let broken = tampered(&original, |tokens| {
            tokens[0].kind = TokenKind::Piece { continuation: true };
        });
        assert_eq!(corrupt_index(reconstruct(&broken)), 0);
    }

    #[test]
    fn test_wrong_source_hash_is_rejected() {
        let original = stream(StrategyKind::Space, "a b");
        let broken = TokenStream::from_parts(
            original.strategy(),
            original.seed(),
            SourceHash::of(b"a c"),
            original.source_len(),
            original.tokens().to_vec(),
        );
        assert_eq!(corrupt_index(reconstruct(&broken)), 3);
    }

    #[test]
    fn test_empty_stream() {
        for kind in StrategyKind::ALL {
            let s = stream(kind, "");
            assert!(s.is_empty());
            assert_eq!(reconstruct(&s).unwrap(), "");
        }
    }
}
