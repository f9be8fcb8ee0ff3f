//! Deterministic, reversible multi-strategy text tokenization
//!
//! The same input can be segmented nine different ways (whitespace runs,
//! words, characters, grammar-aware words, four subword schemes and raw
//! bytes). Every resulting [`TokenStream`] carries stable identifiers and
//! integer features per token, and reconstructs to the exact input bytes.
//!
//! # Architecture
//!
//! - **Strategies** ([`strategy`]): pure segmentation into byte ranges
//! - **Identity** ([`identity`]): uid / content id hashing, neighbor links
//!   and [`features`]
//! - **Reconstruction** ([`reconstruct`], [`verify`]): validated inversion
//!   and byte-level mismatch diagnostics
//!
//! This crate does no I/O and spawns no threads; running several strategies
//! in parallel is the job of `tessera-engine`.
//!
//! # Example
//!
//! ```rust
//! use tessera_core::{reconstruct, StrategyKind, Tokenizer};
//!
//! let tokenizer = Tokenizer::new(42);
//! let stream = tokenizer.tokenize_str(StrategyKind::Word, "Hello, world!").unwrap();
//!
//! assert_eq!(stream.texts(), vec!["Hello", ",", " ", "world", "!"]);
//! assert_eq!(reconstruct(&stream).unwrap(), "Hello, world!");
//! ```

pub mod cancel;
pub mod error;
pub mod features;
pub mod identity;
pub mod options;
pub mod reconstruct;
pub mod strategy;
pub mod token;
pub mod tokenizer;
pub mod verify;

pub use cancel::CancelToken;
pub use error::{CoreError, Result};
pub use identity::{compute_content_id, compute_uid};
pub use options::{
    BpeOptions, CharOptions, CharUnit, FeatureOptions, FixedOptions, FrequencyOptions,
    GrammarOptions, StrategyOptions, SyllableOptions, TieBreak,
};
pub use reconstruct::{reconstruct, reconstruct_bytes, validate_stream};
pub use strategy::{AnyStrategy, BpeModel, SegmentContext, Strategy, StrategyKind};
pub use token::{
    BoundaryKind, ContentId, Segment, SourceHash, Token, TokenFeatures, TokenKind, TokenStream,
    Uid,
};
pub use tokenizer::{tokenize_text, Tokenizer, DEFAULT_SEED};
pub use verify::{compare, verify_round_trip, verify_stream, ReconstructionMismatch, VerifyError};
