//! Concrete end-to-end scenarios

use tessera_core::strategy::{BpeStrategy, SegmentContext};
use tessera_core::{
    reconstruct, BoundaryKind, BpeOptions, CancelToken, StrategyKind, StrategyOptions, TokenKind,
    Tokenizer,
};

#[test]
fn test_hello_world_word() {
    let stream = Tokenizer::default()
        .tokenize_str(StrategyKind::Word, "Hello, world!")
        .unwrap();
    assert_eq!(stream.texts(), vec!["Hello", ",", " ", "world", "!"]);
    assert_eq!(
        stream.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Word,
            TokenKind::Punctuation,
            TokenKind::Whitespace,
            TokenKind::Word,
            TokenKind::Punctuation,
        ]
    );
    assert_eq!(reconstruct(&stream).unwrap(), "Hello, world!");
}

#[test]
fn test_empty_input_every_strategy() {
    let tokenizer = Tokenizer::default();
    for kind in StrategyKind::ALL {
        let stream = tokenizer.tokenize(kind, b"").unwrap();
        assert!(stream.is_empty(), "{kind}");
        assert_eq!(stream.source_len(), 0);
        assert_eq!(reconstruct(&stream).unwrap(), "");
    }
}

#[test]
fn test_cafe_party_by_codepoint() {
    let text = "caf\u{e9} \u{1F389}";
    let stream = Tokenizer::default()
        .tokenize_str(StrategyKind::Char, text)
        .unwrap();
    assert_eq!(stream.texts(), vec!["c", "a", "f", "\u{e9}", " ", "\u{1F389}"]);
    assert_eq!(stream.tokens()[5].start, 6);
    assert_eq!(stream.tokens()[5].end, 10);
    assert_eq!(reconstruct(&stream).unwrap(), text);
}

#[test]
fn test_bpe_two_merges_on_aaaa() {
    let options = StrategyOptions {
        subword_bpe: BpeOptions::with_merges(2),
        ..Default::default()
    };
    let tokenizer = Tokenizer::with_options(42, options.clone()).unwrap();

    let cancel = CancelToken::new();
    let ctx = SegmentContext::new(42, &cancel);
    let model = BpeStrategy::new(options.subword_bpe.clone())
        .learn("aaaa", &ctx)
        .unwrap();
    let merges: Vec<(&str, &str)> = model
        .merges()
        .iter()
        .map(|(l, r)| (l.as_str(), r.as_str()))
        .collect();
    assert_eq!(merges, vec![("a", "a"), ("aa", "aa")]);

    for _ in 0..5 {
        let stream = tokenizer.tokenize_str(StrategyKind::SubwordBpe, "aaaa").unwrap();
        assert_eq!(stream.texts(), vec!["aaaa"]);
        assert_eq!(
            stream.tokens()[0].kind,
            TokenKind::Piece {
                continuation: false
            }
        );
    }
}

#[test]
fn test_byte_count_matches_utf8_length() {
    let text = "na\u{ef}ve \u{1F600}";
    let stream = Tokenizer::default()
        .tokenize_str(StrategyKind::Byte, text)
        .unwrap();
    assert_eq!(stream.len(), text.len());
    assert_eq!(stream.texts()[..3], ["n", "a", "<0xC3>"]);
}

#[test]
fn test_grammar_markers() {
    let stream = Tokenizer::default()
        .tokenize_str(StrategyKind::Grammar, "It rained, but we didn't care.")
        .unwrap();
    let markers: Vec<(usize, BoundaryKind)> = stream
        .iter()
        .filter_map(|t| match t.kind {
            TokenKind::Boundary(kind) => Some((t.start, kind)),
            _ => None,
        })
        .collect();
    assert_eq!(
        markers,
        vec![
            (10, BoundaryKind::ClauseEnd),
            (11, BoundaryKind::Conjunction),
            (30, BoundaryKind::SentenceEnd),
        ]
    );
    assert!(stream.texts().contains(&"didn't"));
    assert_eq!(
        reconstruct(&stream).unwrap(),
        "It rained, but we didn't care."
    );
}

#[test]
fn test_subword_pieces_mark_continuations() {
    let stream = Tokenizer::default()
        .tokenize_str(StrategyKind::SubwordFixed, "tokenize it")
        .unwrap();
    let pieces: Vec<(&str, TokenKind)> =
        stream.iter().map(|t| (t.text.as_str(), t.kind)).collect();
    assert_eq!(
        pieces,
        vec![
            ("tok", TokenKind::Piece { continuation: false }),
            ("eni", TokenKind::Piece { continuation: true }),
            ("ze", TokenKind::Piece { continuation: true }),
            (" ", TokenKind::Whitespace),
            ("it", TokenKind::Piece { continuation: false }),
        ]
    );
}
