//! Token model shared by every strategy

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::strategy::StrategyKind;

/// Position- and seed-dependent token identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(u64);

impl Uid {
    /// Wrap a raw identifier value
    pub const fn new(value: u64) -> Self {
        Uid(value)
    }

    /// Raw 64-bit value
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Text-only identifier, shared by every token with the same text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(u64);

impl ContentId {
    /// Wrap a raw identifier value
    pub const fn new(value: u64) -> Self {
        ContentId(value)
    }

    /// Raw 64-bit value
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Content hash of the input a stream was produced from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceHash(String);

impl SourceHash {
    /// Hash raw input bytes
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        SourceHash(format!("sha256:{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Syntactic cue a grammar boundary marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// After a sentence terminator run
    SentenceEnd,
    /// After clause punctuation
    ClauseEnd,
    /// Before a coordinating conjunction
    Conjunction,
}

/// What a token represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Run of letters (possibly mixed with digits)
    Word,
    /// Run of digits only
    Number,
    /// Run of whitespace, kept so the stream stays reversible
    Whitespace,
    /// Single punctuation grapheme
    Punctuation,
    /// Any other single grapheme (symbols, emoji)
    Symbol,
    /// Single codepoint or grapheme from the character strategy
    Character,
    /// Single raw byte
    Byte,
    /// Subword piece; `continuation` is false for the first piece of a word
    Piece { continuation: bool },
    /// Zero-width structural marker
    Boundary(BoundaryKind),
}

impl TokenKind {
    /// Zero-width kinds carry no text and cover no input
    pub fn is_marker(&self) -> bool {
        matches!(self, TokenKind::Boundary(_))
    }
}

/// Raw segmentation output: a byte range of the input and its kind
///
/// Strategies emit segments; the identifier engine turns them into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

impl Segment {
    pub fn new(start: usize, end: usize, kind: TokenKind) -> Self {
        Self { start, end, kind }
    }

    /// Zero-width marker at `at`
    pub fn marker(at: usize, boundary: BoundaryKind) -> Self {
        Self {
            start: at,
            end: at,
            kind: TokenKind::Boundary(boundary),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Numeric features derived from token text alone (plus neighbors for the
/// backend number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TokenFeatures {
    /// Shannon entropy of the codepoint distribution, in thousandths of a bit
    pub entropy_millibits: u32,
    /// Evenness of the codepoint distribution, 0..=1000
    pub balance_permille: u16,
    /// Compact digit in 1..=9
    pub frontend_digit: u8,
    /// Composite number mixing content, position and neighbors
    pub backend_number: u64,
}

impl TokenFeatures {
    /// Backend number folded into 0..100_000
    pub fn backend_scaled(&self) -> u64 {
        self.backend_number % 100_000
    }
}

/// A single emitted token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Position in the stream
    pub index: usize,
    /// Exact text; empty only for boundary markers
    pub text: String,
    /// Start byte offset into the input (inclusive)
    pub start: usize,
    /// End byte offset into the input (exclusive)
    pub end: usize,
    pub kind: TokenKind,
    pub uid: Uid,
    pub content_id: ContentId,
    pub prev_uid: Option<Uid>,
    pub next_uid: Option<Uid>,
    pub features: TokenFeatures,
}

impl Token {
    /// Length of the covered input in bytes
    pub fn byte_len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Ordered tokens produced by one strategy over one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStream {
    strategy: StrategyKind,
    seed: u64,
    source_hash: SourceHash,
    source_len: usize,
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Assemble a stream from parts
    ///
    /// Nothing is validated here; [`crate::reconstruct`] checks every
    /// invariant before inverting a stream.
    pub fn from_parts(
        strategy: StrategyKind,
        seed: u64,
        source_hash: SourceHash,
        source_len: usize,
        tokens: Vec<Token>,
    ) -> Self {
        Self {
            strategy,
            seed,
            source_hash,
            source_len,
            tokens,
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn source_hash(&self) -> &SourceHash {
        &self.source_hash
    }

    /// Input length in bytes
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Token texts in order
    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// UIDs in order
    pub fn uids(&self) -> Vec<Uid> {
        self.tokens.iter().map(|t| t.uid).collect()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
