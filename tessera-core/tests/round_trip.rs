//! Round-trip law over a corpus of awkward inputs, for every strategy

use tessera_core::{
    reconstruct, reconstruct_bytes, verify_stream, BpeOptions, CharOptions, CharUnit,
    FixedOptions, FrequencyOptions, StrategyKind, StrategyOptions, TieBreak, Tokenizer,
};

const CORPUS: &[&str] = &[
    "",
    " ",
    "\n\n\t  \r\n",
    "a",
    "Hello, world!",
    "The quick brown fox jumps over the lazy dog. And then? It slept; soundly.",
    "caf\u{e9} \u{1F389}",
    "cafe\u{301} na\u{308}ive",
    // zalgo: stacked combining marks
    "Z\u{351}\u{36b}\u{343}\u{36a}a\u{302}\u{36b}\u{33d}l\u{35b}\u{30f}g\u{341}o\u{35c}",
    "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467} family \u{1F1EF}\u{1F1F5}",
    "\u{4eca}\u{65e5}\u{306f}\u{3001}\u{4e16}\u{754c}\u{3002}\u{5143}\u{6c17}\u{ff1f}",
    "\u{645}\u{631}\u{62d}\u{628}\u{627} \u{628}\u{627}\u{644}\u{639}\u{627}\u{644}\u{645}",
    "don't stop \u{2014} it's well-known: 3.14, 1,000,000 and 42!",
    "x\u{200B}y\u{FEFF}z\u{00A0}w",
    "!!!???...,,,",
];

fn option_sets() -> Vec<StrategyOptions> {
    vec![
        StrategyOptions::default(),
        StrategyOptions {
            character: CharOptions {
                unit: CharUnit::Grapheme,
            },
            subword_fixed: FixedOptions { chunk_len: 1 },
            subword_bpe: BpeOptions {
                max_merges: 500,
                tie_break: TieBreak::Seeded,
                ..Default::default()
            },
            subword_frequency: FrequencyOptions {
                max_len: 8,
                min_frequency: 1,
                tie_break: TieBreak::Seeded,
            },
            ..Default::default()
        },
    ]
}

#[test]
fn test_corpus_round_trips() {
    for options in option_sets() {
        let tokenizer = Tokenizer::with_options(42, options).unwrap();
        for text in CORPUS {
            for kind in StrategyKind::ALL {
                let stream = tokenizer.tokenize_str(kind, text).unwrap();
                assert_eq!(
                    reconstruct(&stream).unwrap(),
                    *text,
                    "{kind} failed on {text:?}"
                );
            }
        }
    }
}

#[test]
fn test_long_repetitive_input() {
    let text = "a".repeat(1000);
    let tokenizer = Tokenizer::default();
    for kind in StrategyKind::ALL {
        let stream = tokenizer.verify(kind, text.as_bytes()).unwrap();
        assert!(!stream.is_empty(), "{kind}");
    }
}

#[test]
fn test_arbitrary_bytes_via_byte_strategy() {
    let input: Vec<u8> = (0..=255u8).rev().collect();
    let tokenizer = Tokenizer::default();
    let stream = tokenizer.tokenize(StrategyKind::Byte, &input).unwrap();

    assert_eq!(stream.len(), 256);
    assert_eq!(reconstruct_bytes(&stream).unwrap(), input);
    verify_stream(&stream, &input).unwrap();
}

#[test]
fn test_whitespace_only_is_preserved() {
    let text = " \t \n ";
    let tokenizer = Tokenizer::default();
    for kind in [StrategyKind::Space, StrategyKind::Word, StrategyKind::Grammar] {
        let stream = tokenizer.tokenize_str(kind, text).unwrap();
        assert_eq!(stream.texts(), vec![text], "{kind}");
    }
}
