//! Identifier & feature assignment
//!
//! Turns the raw segments of one strategy into an annotated
//! [`TokenStream`]:
//!
//! 1. token text is materialised from the input,
//! 2. `uid` and `content_id` are computed,
//! 3. one in-order walk links neighbors and fills in the features.
//!
//! # Hash construction
//!
//! Both identifiers are the first eight bytes (big-endian) of a SHA-256
//! digest over a domain-separated, length-prefixed encoding:
//!
//! ```text
//! uid        = SHA256("tessera/uid/v1" | len(name) | name | seed | index | len(text) | text)
//! content_id = SHA256("tessera/content/v1" | text)
//! ```
//!
//! All integers are encoded as little-endian `u64`.

use sha2::{Digest, Sha256};

use crate::cancel::CancelToken;
use crate::error::{CoreError, Result};
use crate::features::{backend_number, text_features};
use crate::options::FeatureOptions;
use crate::strategy::{byte::render_byte, StrategyKind};
use crate::token::{ContentId, Segment, SourceHash, Token, TokenKind, TokenStream, Uid};

const UID_DOMAIN: &[u8] = b"tessera/uid/v1";
const CONTENT_DOMAIN: &[u8] = b"tessera/content/v1";

fn leading_u64(digest: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(buf)
}

/// Stable identifier for a token at a position
pub fn compute_uid(strategy: &str, seed: u64, index: usize, text: &str) -> Uid {
    let mut hasher = Sha256::new();
    hasher.update(UID_DOMAIN);
    hasher.update((strategy.len() as u64).to_le_bytes());
    hasher.update(strategy.as_bytes());
    hasher.update(seed.to_le_bytes());
    hasher.update((index as u64).to_le_bytes());
    hasher.update((text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
    Uid::new(leading_u64(&hasher.finalize()))
}

/// Position-independent identifier for a token text
pub fn compute_content_id(text: &str) -> ContentId {
    let mut hasher = Sha256::new();
    hasher.update(CONTENT_DOMAIN);
    hasher.update(text.as_bytes());
    ContentId::new(leading_u64(&hasher.finalize()))
}

/// SplitMix64 finaliser
pub(crate) fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seeded ordering key for tie-breaking between candidate texts
pub(crate) fn seeded_rank(seed: u64, parts: &[&str]) -> u64 {
    let mut acc = mix64(seed);
    for part in parts {
        for &b in part.as_bytes() {
            acc = mix64(acc ^ u64::from(b));
        }
        // separator so ("ab", "c") and ("a", "bc") differ
        acc = mix64(acc ^ 0xFF);
    }
    acc
}

/// Text a segment stands for
fn segment_text(input: &[u8], segment: &Segment) -> Result<String> {
    match segment.kind {
        TokenKind::Boundary(_) => Ok(String::new()),
        TokenKind::Byte => Ok(render_byte(input[segment.start])),
        _ => std::str::from_utf8(&input[segment.start..segment.end])
            .map(str::to_owned)
            .map_err(|_| {
                CoreError::corrupt(segment.start, "segment does not fall on UTF-8 boundaries")
            }),
    }
}

/// Build the annotated stream for `segments`
pub(crate) fn assign_identifiers(
    strategy: StrategyKind,
    seed: u64,
    input: &[u8],
    segments: &[Segment],
    options: &FeatureOptions,
    cancel: &CancelToken,
) -> Result<TokenStream> {
    let name = strategy.name();
    let mut tokens = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        cancel.checkpoint()?;
        let text = segment_text(input, segment)?;
        let uid = compute_uid(name, seed, index, &text);
        let content_id = compute_content_id(&text);
        let features = text_features(&text, content_id, options);
        tokens.push(Token {
            index,
            text,
            start: segment.start,
            end: segment.end,
            kind: segment.kind,
            uid,
            content_id,
            prev_uid: None,
            next_uid: None,
            features,
        });
    }

    link_neighbors(&mut tokens, options);

    Ok(TokenStream::from_parts(
        strategy,
        seed,
        SourceHash::of(input),
        input.len(),
        tokens,
    ))
}

/// Single in-order walk setting neighbor uids and the backend number
fn link_neighbors(tokens: &mut [Token], options: &FeatureOptions) {
    let uids: Vec<Uid> = tokens.iter().map(|t| t.uid).collect();
    for (i, token) in tokens.iter_mut().enumerate() {
        token.prev_uid = i.checked_sub(1).map(|p| uids[p]);
        token.next_uid = uids.get(i + 1).copied();
        token.features.backend_number = backend_number(
            token.content_id,
            token.index,
            token.uid,
            token.prev_uid,
            token.next_uid,
            options,
        );
    }
}
