//! Integer-only token features
//!
//! Every feature here is a pure function of its arguments and uses no
//! floating point, so values are bit-identical across runs and platforms.

use std::collections::BTreeMap;

use crate::identity::mix64;
use crate::options::FeatureOptions;
use crate::token::{ContentId, TokenFeatures, Uid};

/// Fractional bits of the fixed-point log2
const LOG2_FRAC_BITS: u32 = 16;

/// log2(x) in Q16 fixed point, for x >= 1
///
/// Integer part from the highest set bit, fraction by repeated squaring of
/// the normalised mantissa.
pub fn log2_q16(x: u64) -> u64 {
    debug_assert!(x > 0, "log2 of zero");
    if x == 0 {
        return 0;
    }
    let int_part = 63 - u64::from(x.leading_zeros());
    // Mantissa in Q32, within [1, 2)
    let mut y: u128 = (u128::from(x) << 32) >> int_part;
    let mut frac = 0u64;
    for bit in (0..LOG2_FRAC_BITS).rev() {
        y = (y * y) >> 32;
        if y >= (2u128 << 32) {
            y >>= 1;
            frac |= 1 << bit;
        }
    }
    (int_part << LOG2_FRAC_BITS) | frac
}

fn codepoint_counts(text: &str) -> BTreeMap<char, u64> {
    let mut counts = BTreeMap::new();
    for ch in text.chars() {
        *counts.entry(ch).or_insert(0u64) += 1;
    }
    counts
}

/// Shannon entropy of the codepoint distribution in millibits
///
/// H = log2(n) - (1/n) * sum(c * log2(c)), evaluated in Q16.
pub fn entropy_millibits(text: &str) -> u32 {
    let counts = codepoint_counts(text);
    let n: u64 = counts.values().sum();
    if n <= 1 || counts.len() == 1 {
        return 0;
    }

    let n_log_n = u128::from(n) * u128::from(log2_q16(n));
    let sum_c_log_c: u128 = counts
        .values()
        .map(|&c| u128::from(c) * u128::from(log2_q16(c)))
        .sum();
    let h_q16 = n_log_n.saturating_sub(sum_c_log_c) / u128::from(n);
    let millibits = (h_q16 * 1000 + (1 << (LOG2_FRAC_BITS - 1))) >> LOG2_FRAC_BITS;
    u32::try_from(millibits).unwrap_or(u32::MAX)
}

/// 1000 * (rarest codepoint count) / (most common codepoint count)
pub fn balance_permille(text: &str) -> u16 {
    let counts = codepoint_counts(text);
    let (Some(&min), Some(&max)) = (counts.values().min(), counts.values().max()) else {
        return 0;
    };
    // min <= max, so the quotient is at most 1000
    u16::try_from(min * 1000 / max).unwrap_or(1000)
}

/// Digital root: 0 for 0, otherwise 1..=9
fn digital_root(x: u64) -> u64 {
    if x == 0 {
        0
    } else {
        1 + (x - 1) % 9
    }
}

/// Compact 1..=9 digit for a token
///
/// Combines the digital root of the position-weighted codepoint sum with
/// the last decimal digit of the content id.
pub fn frontend_digit(text: &str, content_id: ContentId, options: &FeatureOptions) -> u8 {
    let weighted = text
        .chars()
        .enumerate()
        .fold(0u64, |acc, (i, ch)| {
            acc.wrapping_add((i as u64 + 1).wrapping_mul(u64::from(ch)))
        });
    let hash_digit = content_id.value() % 10;
    let mut digit = (digital_root(weighted) + hash_digit) % 9 + 1;
    if options.embedding_bit {
        digit = digit % 9 + 1;
    }
    digit as u8
}

/// Composite number mixing content, position and neighborhood
pub fn backend_number(
    content_id: ContentId,
    index: usize,
    uid: Uid,
    prev: Option<Uid>,
    next: Option<Uid>,
    options: &FeatureOptions,
) -> u64 {
    [
        index as u64,
        uid.value(),
        prev.map_or(0, Uid::value),
        next.map_or(0, Uid::value),
        u64::from(options.embedding_bit),
    ]
    .into_iter()
    .fold(content_id.value(), |acc, part| mix64(acc ^ mix64(part)))
}

/// Text-only features; the backend number is filled in once neighbors are
/// known
pub(crate) fn text_features(
    text: &str,
    content_id: ContentId,
    options: &FeatureOptions,
) -> TokenFeatures {
    TokenFeatures {
        entropy_millibits: entropy_millibits(text),
        balance_permille: balance_permille(text),
        frontend_digit: frontend_digit(text, content_id, options),
        backend_number: 0,
    }
}
