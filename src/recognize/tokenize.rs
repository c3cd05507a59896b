//! Splitting raw input into terminal symbols.
//!
//! Positions are counted in chars. A window is a run of consecutive chars
//! starting at the current position; the shortest window equal to some
//! terminal wins when tokenizing greedily.

use super::grammar::{CompiledGrammar, SymbolId};
use crate::error::Error;
use crate::{HashMap, tracing};

/// Terminal lookup by text, shared by every tokenization of a grammar.
#[derive(Debug, Default)]
pub(crate) struct Tokenizer {
    terminals: HashMap<String, SymbolId>,
    /// Longest terminal, in chars
    longest: usize,
}

impl Tokenizer {
    pub fn new(grammar: &CompiledGrammar) -> Self {
        let mut tokenizer = Self::default();
        for (id, symbol) in grammar.terminals_iter() {
            let len = symbol.char_len();
            if len == 0 {
                continue;
            }
            tokenizer.longest = tokenizer.longest.max(len);
            tokenizer.terminals.insert(symbol.as_str().to_owned(), id);
        }
        tokenizer
    }

    /// Greedy left-to-right split, shortest matching window first.
    ///
    /// Greedy means no backtracking: with terminals `a`, `b` and `bb` the
    /// input `abb` always splits as `a b b`.
    pub fn tokenize(&self, input: &str) -> Result<Vec<SymbolId>, Error> {
        let _span = tracing::span!(tracing::Level::DEBUG, "tokenize").entered();
        let boundaries = CharBoundaries::new(input);
        let mut tape = vec![];
        let mut pos = 0;

        while pos < boundaries.char_len() {
            let Some((width, id)) = self.matches_at(input, &boundaries, pos).next() else {
                tracing::event!(tracing::Level::DEBUG, "no terminal at offset {pos}");
                return Err(Error::UnrecognizedInput { offset: pos });
            };
            tape.push(id);
            pos += width;
        }

        Ok(tape)
    }

    /// Every way to split `input` into terminals.
    ///
    /// Splits are produced lazily, depth first, trying shorter windows
    /// before longer ones, so the first one is the greedy tokenization when
    /// that succeeds. Dead ends are pruned up front, so each step of the
    /// iterator does bounded work.
    pub fn segmentations<'t>(&'t self, input: &'t str) -> Segmentations<'t> {
        let boundaries = CharBoundaries::new(input);
        let completes = self.completable(input, &boundaries);
        let stack = if completes.first().copied().unwrap_or(false) {
            vec![(0, vec![])]
        } else {
            vec![]
        };
        Segmentations {
            tokenizer: self,
            input,
            boundaries,
            completes,
            stack,
        }
    }

    /// Char offset where segmentation gets stuck, or `None` if `input` can
    /// be split into terminals completely.
    pub fn stuck_at(&self, input: &str) -> Option<usize> {
        let boundaries = CharBoundaries::new(input);
        let end = boundaries.char_len();
        let mut reached = vec![false; end + 1];
        if let Some(first) = reached.first_mut() {
            *first = true;
        }
        let mut furthest = 0;

        for pos in 0..end {
            if !reached.get(pos).copied().unwrap_or(false) {
                continue;
            }
            furthest = pos;
            for (width, _) in self.matches_at(input, &boundaries, pos) {
                if let Some(next) = reached.get_mut(pos + width) {
                    *next = true;
                }
            }
        }

        if reached.get(end).copied().unwrap_or(false) {
            None
        } else {
            Some(furthest)
        }
    }

    /// Terminals matching a window starting at `pos`, shortest first.
    fn matches_at<'a>(
        &'a self,
        input: &'a str,
        boundaries: &'a CharBoundaries,
        pos: usize,
    ) -> impl Iterator<Item = (usize, SymbolId)> + 'a {
        (1..=self.longest).filter_map(move |width| {
            let window = boundaries.window(input, pos, width)?;
            self.terminals.get(window).map(|&id| (width, id))
        })
    }

    /// For each char position, whether the rest of the input from there can
    /// be split into terminals.
    fn completable(&self, input: &str, boundaries: &CharBoundaries) -> Vec<bool> {
        let end = boundaries.char_len();
        let mut completes = vec![false; end + 1];
        if let Some(last) = completes.last_mut() {
            *last = true;
        }
        for pos in (0..end).rev() {
            let reachable = self
                .matches_at(input, boundaries, pos)
                .any(|(width, _)| completes.get(pos + width).copied().unwrap_or(false));
            if let Some(slot) = completes.get_mut(pos) {
                *slot = reachable;
            }
        }
        completes
    }
}

/// Byte offset of every char boundary of an input, end included.
#[derive(Debug)]
struct CharBoundaries(Vec<usize>);

impl CharBoundaries {
    fn new(input: &str) -> Self {
        let mut offsets: Vec<usize> = input.char_indices().map(|(idx, _)| idx).collect();
        offsets.push(input.len());
        Self(offsets)
    }

    const fn char_len(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// The `width` chars starting at char `pos`.
    fn window<'i>(&self, input: &'i str, pos: usize, width: usize) -> Option<&'i str> {
        let start = *self.0.get(pos)?;
        let end = *self.0.get(pos + width)?;
        input.get(start..end)
    }
}

/// Lazy iterator over the terminal splits of an input.
#[derive(Debug)]
pub(crate) struct Segmentations<'t> {
    tokenizer: &'t Tokenizer,
    input: &'t str,
    boundaries: CharBoundaries,
    completes: Vec<bool>,
    stack: Vec<(usize, Vec<SymbolId>)>,
}

impl Iterator for Segmentations<'_> {
    type Item = Vec<SymbolId>;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.boundaries.char_len();
        while let Some((pos, tape)) = self.stack.pop() {
            if pos == end {
                return Some(tape);
            }
            let next: Vec<(usize, SymbolId)> = self
                .tokenizer
                .matches_at(self.input, &self.boundaries, pos)
                .filter(|(width, _)| self.completes.get(pos + width).copied().unwrap_or(false))
                .collect();
            for (width, id) in next.into_iter().rev() {
                let mut tape = tape.clone();
                tape.push(id);
                self.stack.push((pos + width, tape));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn names(grammar: &CompiledGrammar, tape: &[SymbolId]) -> Vec<String> {
        tape.iter()
            .filter_map(|id| grammar.symbol(*id))
            .map(ToString::to_string)
            .collect()
    }

    fn setup(text: &str) -> (CompiledGrammar, Tokenizer) {
        let grammar: Grammar = text.parse().unwrap();
        let compiled = CompiledGrammar::new(&grammar);
        let tokenizer = Tokenizer::new(&compiled);
        (compiled, tokenizer)
    }

    #[test]
    fn greedy_prefers_shortest_window() {
        let (compiled, tokenizer) = setup("S -> A B\nA -> a\nB -> b | bb");
        let tape = tokenizer.tokenize("abb").unwrap();
        assert_eq!(names(&compiled, &tape), vec!["a", "b", "b"]);
    }

    #[test]
    fn greedy_stops_where_nothing_matches() {
        let (_, tokenizer) = setup("S -> A B\nA -> a\nB -> b | bb");
        assert_eq!(
            tokenizer.tokenize("abxb"),
            Err(Error::UnrecognizedInput { offset: 2 })
        );
        assert_eq!(tokenizer.tokenize(""), Ok(vec![]));
    }

    #[test]
    fn greedy_can_fail_where_a_split_exists() {
        let (compiled, tokenizer) = setup("S -> a | ab c");
        assert_eq!(
            tokenizer.tokenize("abc"),
            Err(Error::UnrecognizedInput { offset: 1 })
        );
        let splits: Vec<_> = tokenizer
            .segmentations("abc")
            .map(|tape| names(&compiled, &tape))
            .collect();
        assert_eq!(splits, vec![vec!["ab", "c"]]);
        assert_eq!(tokenizer.stuck_at("abc"), None);
    }

    #[test]
    fn all_splits_shortest_first() {
        let (compiled, tokenizer) = setup("S -> A B\nA -> a\nB -> b | bb");
        let splits: Vec<_> = tokenizer
            .segmentations("abb")
            .map(|tape| names(&compiled, &tape))
            .collect();
        assert_eq!(splits, vec![vec!["a", "b", "b"], vec!["a", "bb"]]);
    }

    #[test]
    fn unsplittable_input() {
        let (_, tokenizer) = setup("S -> a b");
        assert_eq!(tokenizer.segmentations("abc").count(), 0);
        assert_eq!(tokenizer.stuck_at("abc"), Some(2));
        assert_eq!(tokenizer.stuck_at("xab"), Some(0));
    }

    #[test]
    fn offsets_count_chars() {
        let (compiled, tokenizer) = setup("S -> é ß");
        let tape = tokenizer.tokenize("éß").unwrap();
        assert_eq!(names(&compiled, &tape), vec!["é", "ß"]);
        assert_eq!(
            tokenizer.tokenize("éx"),
            Err(Error::UnrecognizedInput { offset: 1 })
        );
    }

    #[test]
    fn empty_input_has_one_empty_split() {
        let (_, tokenizer) = setup("S -> a");
        assert_eq!(tokenizer.segmentations("").collect::<Vec<_>>(), vec![vec![]]);
    }
}
