//! BPE-style subword strategy
//!
//! Merges are learned from the input itself. Each distinct word starts as
//! its sequence of grapheme clusters; every round counts adjacent symbol
//! pairs (overlapping, weighted by word frequency) and merges the most
//! frequent pair everywhere, non-overlapping and left to right.
//!
//! Learning stops at the first of: `max_merges` reached, the vocabulary
//! (base symbols plus merges) reaching `vocab_size`, the best pair falling
//! below `min_frequency`, or no pairs left.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;

use super::{grapheme_bounds, split_words, PieceEnds};
use crate::error::Result;
use crate::identity::seeded_rank;
use crate::options::{BpeOptions, TieBreak};
use crate::strategy::word::word_segments;
use crate::strategy::{SegmentContext, Strategy, StrategyKind};
use crate::token::{Segment, TokenKind};

/// Ordered merge list learned from one input
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BpeModel {
    merges: Vec<(String, String)>,
}

#[derive(Default)]
struct SymbolTable {
    texts: Vec<String>,
    ids: HashMap<String, u32>,
}

impl SymbolTable {
    fn intern(&mut self, text: &str) -> u32 {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        let id = self.texts.len() as u32;
        self.texts.push(text.to_owned());
        self.ids.insert(text.to_owned(), id);
        id
    }

    fn text(&self, id: u32) -> &str {
        &self.texts[id as usize]
    }
}

type Candidate = ((u32, u32), u64);

/// Higher count first, then the configured tie-break, then lexicographic
fn compare_candidates(
    a: &Candidate,
    b: &Candidate,
    table: &SymbolTable,
    tie_break: TieBreak,
    seed: u64,
) -> Ordering {
    let ((al, ar), a_count) = *a;
    let ((bl, br), b_count) = *b;
    let a_pair = (table.text(al), table.text(ar));
    let b_pair = (table.text(bl), table.text(br));

    b_count
        .cmp(&a_count)
        .then_with(|| match tie_break {
            TieBreak::Canonical => Ordering::Equal,
            TieBreak::Seeded => seeded_rank(seed, &[a_pair.0, a_pair.1])
                .cmp(&seeded_rank(seed, &[b_pair.0, b_pair.1])),
        })
        .then_with(|| a_pair.cmp(&b_pair))
}

fn merge_pair(symbols: &mut Vec<u32>, pair: (u32, u32), merged: u32) {
    let mut read = 0;
    let mut write = 0;
    while read < symbols.len() {
        if read + 1 < symbols.len() && symbols[read] == pair.0 && symbols[read + 1] == pair.1 {
            symbols[write] = merged;
            read += 2;
        } else {
            symbols[write] = symbols[read];
            read += 1;
        }
        write += 1;
    }
    symbols.truncate(write);
}

impl BpeModel {
    /// Learn merges from the words of `text`
    pub fn learn(text: &str, options: &BpeOptions, ctx: &SegmentContext<'_>) -> Result<Self> {
        let words = word_segments(text, ctx)?;
        Self::learn_from_words(text, &words, options, ctx)
    }

    pub(crate) fn learn_from_words(
        text: &str,
        words: &[Segment],
        options: &BpeOptions,
        ctx: &SegmentContext<'_>,
    ) -> Result<Self> {
        let mut frequencies: BTreeMap<&str, u64> = BTreeMap::new();
        for seg in words {
            if matches!(seg.kind, TokenKind::Word | TokenKind::Number) {
                *frequencies.entry(&text[seg.start..seg.end]).or_default() += 1;
            }
        }

        let mut table = SymbolTable::default();
        let mut corpus: Vec<(Vec<u32>, u64)> = Vec::with_capacity(frequencies.len());
        for (word, freq) in frequencies {
            let mut symbols = Vec::new();
            for grapheme in word.graphemes(true) {
                symbols.push(table.intern(grapheme));
            }
            corpus.push((symbols, freq));
        }

        let alphabet = table.texts.len();
        let mut merges = Vec::new();

        while merges.len() < options.max_merges {
            if options
                .vocab_size
                .is_some_and(|limit| alphabet + merges.len() >= limit)
            {
                break;
            }
            ctx.checkpoint()?;

            let mut pairs: HashMap<(u32, u32), u64> = HashMap::new();
            for (symbols, freq) in &corpus {
                for pair in symbols.windows(2) {
                    *pairs.entry((pair[0], pair[1])).or_default() += freq;
                }
            }

            let best = pairs
                .into_iter()
                .filter(|&(_, count)| count >= options.min_frequency)
                .min_by(|a, b| compare_candidates(a, b, &table, options.tie_break, ctx.seed()));
            let Some(((left, right), count)) = best else {
                break;
            };

            let merged_text = format!("{}{}", table.text(left), table.text(right));
            let merged = table.intern(&merged_text);
            trace!(
                left = table.text(left),
                right = table.text(right),
                count,
                "bpe merge"
            );

            for (symbols, _) in corpus.iter_mut() {
                merge_pair(symbols, (left, right), merged);
            }
            merges.push((table.text(left).to_owned(), table.text(right).to_owned()));
        }

        debug!(merges = merges.len(), alphabet, "learned bpe merges");
        Ok(BpeModel { merges })
    }

    /// Merges in the order they were learned
    pub fn merges(&self) -> &[(String, String)] {
        &self.merges
    }

    pub fn len(&self) -> usize {
        self.merges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    /// Split `word` by replaying the merges in order
    pub fn apply<'w>(&self, word: &'w str) -> Vec<&'w str> {
        let mut ends = PieceEnds::new();
        self.piece_ends(word, &mut ends);
        let mut start = 0;
        ends.into_iter()
            .map(|end| {
                let piece = &word[start..end];
                start = end;
                piece
            })
            .collect()
    }

    pub(crate) fn piece_ends(&self, word: &str, ends: &mut PieceEnds) {
        let bounds = grapheme_bounds(word);
        let mut symbols: Vec<(usize, usize)> = bounds.windows(2).map(|w| (w[0], w[1])).collect();

        for (left, right) in &self.merges {
            if symbols.len() < 2 {
                break;
            }
            let mut read = 0;
            let mut write = 0;
            while read < symbols.len() {
                let (start, end) = symbols[read];
                if let Some(&(next_start, next_end)) = symbols.get(read + 1) {
                    if &word[start..end] == left.as_str()
                        && &word[next_start..next_end] == right.as_str()
                    {
                        symbols[write] = (start, next_end);
                        read += 2;
                        write += 1;
                        continue;
                    }
                }
                symbols[write] = symbols[read];
                read += 1;
                write += 1;
            }
            symbols.truncate(write);
        }

        ends.extend(symbols.iter().map(|&(_, end)| end));
    }
}

#[derive(Debug, Clone, Default)]
pub struct BpeStrategy {
    options: BpeOptions,
}

impl BpeStrategy {
    pub fn new(options: BpeOptions) -> Self {
        Self { options }
    }

    /// The merge list `segment` would use for `text`
    pub fn learn(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<BpeModel> {
        BpeModel::learn(text, &self.options, ctx)
    }
}

impl Strategy for BpeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SubwordBpe
    }

    fn segment(&self, text: &str, ctx: &SegmentContext<'_>) -> Result<Vec<Segment>> {
        let words = word_segments(text, ctx)?;
        let model = BpeModel::learn_from_words(text, &words, &self.options, ctx)?;

        let mut cache: HashMap<&str, PieceEnds> = HashMap::new();
        split_words(text, &words, ctx, |word, ends| {
            let cached = cache.entry(word).or_insert_with(|| {
                let mut pieces = PieceEnds::new();
                model.piece_ends(word, &mut pieces);
                pieces
            });
            ends.extend_from_slice(cached);
        })
    }
}
