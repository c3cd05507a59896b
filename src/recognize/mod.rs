//! Deciding whether a string belongs to the language of a grammar.
//!
//! A [`Recognizer`] compiles a [`Grammar`] once and then answers any number
//! of membership queries. Two strategies are available:
//!
//! * [`Strategy::Chart`] runs an Earley chart over the raw input and is
//!   exact for every context-free grammar.
//! * [`Strategy::Reduction`] splits the input into terminals, trying every
//!   split, and reduces each split bottom-up in passes where every symbol
//!   of a pass must be consumed by some production. It accepts a subset of
//!   the language and resolves shared right-hand sides to the rule declared
//!   last; see [`Recognizer::conflicts`].

mod earley;
mod grammar;
mod reduce;
mod tokenize;

pub use reduce::ReductionConflict;

use crate::error::Error;
use crate::symbol::Symbol;
use crate::{Grammar, tracing};
use grammar::CompiledGrammar;
use reduce::{ReductionIndex, SeenTapes};
use std::fmt;
use tokenize::Tokenizer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a [`Recognizer`] decides membership.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Strategy {
    /// Earley chart recognition
    #[default]
    Chart,
    /// Pass-based bottom-up reduction over every terminal split of the input
    Reduction,
}

/// Why an input was not recognized.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Rejection {
    /// The start symbol has no rule in the grammar
    NotANonterminal(String),
    /// The input cannot be split into terminals past this char offset
    UnrecognizedInput { offset: usize },
    /// The input splits into terminals but no derivation produces it
    NoDerivation,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotANonterminal(symbol) => write!(f, "'{symbol}' is not a nonterminal"),
            Self::UnrecognizedInput { offset } => {
                write!(f, "No terminal matches input at offset {offset}")
            }
            Self::NoDerivation => write!(f, "No derivation produces the input"),
        }
    }
}

impl std::error::Error for Rejection {}

/// A [`Grammar`] compiled for membership queries.
///
/// ```rust
/// use cfg_engine::{Grammar, Strategy};
///
/// let grammar: Grammar = "S -> A B
/// A -> a
/// B -> b | bb".parse().unwrap();
///
/// let recognizer = grammar.build_recognizer();
/// assert!(recognizer.validate("abb", "S"));
/// assert!(!recognizer.validate("abbb", "S"));
///
/// let reducer = recognizer.with_strategy(Strategy::Reduction);
/// assert!(reducer.validate("ab", "S"));
/// ```
#[derive(Debug)]
pub struct Recognizer {
    grammar: CompiledGrammar,
    tokenizer: Tokenizer,
    index: ReductionIndex,
    strategy: Strategy,
}

impl Recognizer {
    #[must_use]
    pub fn new(grammar: &Grammar) -> Self {
        let _span = tracing::span!(tracing::Level::DEBUG, "Recognizer::new").entered();
        let grammar = CompiledGrammar::new(grammar);
        let tokenizer = Tokenizer::new(&grammar);
        let index = ReductionIndex::new(&grammar);
        Self {
            grammar,
            tokenizer,
            index,
            strategy: Strategy::default(),
        }
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Right-hand sides shared by rules with different left-hand sides.
    ///
    /// [`Strategy::Reduction`] only ever reduces such a right-hand side to
    /// the rule declared last.
    #[must_use]
    pub fn conflicts(&self) -> &[ReductionConflict] {
        self.index.conflicts()
    }

    /// Split `input` greedily into terminal symbols, shortest match first.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnrecognizedInput` with the char offset where no
    /// terminal matches.
    pub fn tokenize(&self, input: &str) -> Result<Vec<&Symbol>, Error> {
        let tape = self.tokenizer.tokenize(input)?;
        Ok(tape
            .into_iter()
            .filter_map(|id| self.grammar.symbol(id))
            .collect())
    }

    /// Decide whether `start` derives `input`, explaining a rejection.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] reason when `input` is not recognized.
    pub fn recognize(&self, input: &str, start: &str) -> Result<(), Rejection> {
        let _span = tracing::span!(tracing::Level::DEBUG, "recognize").entered();
        let Some(start_id) = self.grammar.nonterminal_id(start) else {
            return Err(Rejection::NotANonterminal(start.to_owned()));
        };

        if let Some(offset) = self.tokenizer.stuck_at(input) {
            tracing::event!(tracing::Level::DEBUG, "input stuck at offset {offset}");
            return Err(Rejection::UnrecognizedInput { offset });
        }

        let accepted = match self.strategy {
            Strategy::Chart => earley::recognize(&self.grammar, input, start_id),
            Strategy::Reduction => {
                let mut seen = SeenTapes::default();
                self.tokenizer
                    .segmentations(input)
                    .any(|tape| reduce::reduces_to(&self.index, tape, start_id, &mut seen))
            }
        };

        if accepted {
            Ok(())
        } else {
            Err(Rejection::NoDerivation)
        }
    }

    /// Whether `start` derives `input`.
    #[must_use]
    pub fn validate(&self, input: &str, start: &str) -> bool {
        self.recognize(input, start).is_ok()
    }
}

/// Whether `start_symbol` derives `input`, using [`Strategy::Chart`].
///
/// Compiles the grammar on every call; build a [`Recognizer`] once when
/// validating many inputs.
#[must_use]
pub fn validate(input: &str, start_symbol: &str, grammar: &Grammar) -> bool {
    Recognizer::new(grammar).validate(input, start_symbol)
}

/// Split `input` greedily into terminals of `grammar`, shortest match first.
///
/// # Errors
///
/// Returns `Error::UnrecognizedInput` with the char offset where no
/// terminal matches.
pub fn tokenize(input: &str, grammar: &Grammar) -> Result<Vec<Symbol>, Error> {
    let recognizer = Recognizer::new(grammar);
    let tape = recognizer.tokenize(input)?;
    Ok(tape.into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grammar {
        Grammar::from_pairs([
            ("S", vec![vec!["A", "B"]]),
            ("A", vec![vec!["a"]]),
            ("B", vec![vec!["b"], vec!["bb"]]),
        ])
        .unwrap()
    }

    #[test]
    fn validate_sample() {
        let grammar = sample();
        assert!(validate("ab", "S", &grammar));
        assert!(validate("abb", "S", &grammar));
        assert!(!validate("abbb", "S", &grammar));
        assert!(!validate("", "S", &grammar));
    }

    #[test]
    fn strategies_agree_on_sample() {
        let grammar = sample();
        let chart = Recognizer::new(&grammar);
        let reduction = Recognizer::new(&grammar).with_strategy(Strategy::Reduction);
        for input in ["", "a", "b", "ab", "abb", "abbb", "ba", "aab"] {
            assert_eq!(
                chart.validate(input, "S"),
                reduction.validate(input, "S"),
                "{input}"
            );
        }
    }

    #[test]
    fn rejection_reasons() {
        let recognizer = Recognizer::new(&sample());
        assert_eq!(recognizer.recognize("abb", "S"), Ok(()));
        assert_eq!(
            recognizer.recognize("abxb", "S"),
            Err(Rejection::UnrecognizedInput { offset: 2 })
        );
        assert_eq!(
            recognizer.recognize("abbb", "S"),
            Err(Rejection::NoDerivation)
        );
        assert_eq!(
            recognizer.recognize("ab", "a"),
            Err(Rejection::NotANonterminal(String::from("a")))
        );
        assert!(!recognizer.validate("ab", "Z"));
    }

    #[test]
    fn rejection_display() {
        assert_eq!(
            Rejection::UnrecognizedInput { offset: 4 }.to_string(),
            "No terminal matches input at offset 4"
        );
        assert_eq!(
            Rejection::NotANonterminal(String::from("x")).to_string(),
            "'x' is not a nonterminal"
        );
    }

    #[test]
    fn chart_finds_what_reduction_cannot() {
        let grammar: Grammar = "S -> A B\nA -> a | a A\nB -> b".parse().unwrap();
        let chart = Recognizer::new(&grammar);
        let reduction = Recognizer::new(&grammar).with_strategy(Strategy::Reduction);
        assert!(chart.validate("aab", "S"));
        assert!(!reduction.validate("aab", "S"));
        assert!(reduction.validate("ab", "S"));
    }

    #[test]
    fn empty_input_needs_nullable_start() {
        let grammar: Grammar = "S -> ε | a S".parse().unwrap();
        assert!(validate("", "S", &grammar));
        let reduction = Recognizer::new(&grammar).with_strategy(Strategy::Reduction);
        assert!(!reduction.validate("", "S"));
    }

    #[test]
    fn conflicts_are_reported() {
        let grammar: Grammar = "S -> A | B\nA -> x\nB -> x".parse().unwrap();
        let recognizer = grammar.build_recognizer();
        assert_eq!(recognizer.conflicts().len(), 1);
        assert!(recognizer.validate("x", "S"));
        assert!(
            recognizer
                .with_strategy(Strategy::Reduction)
                .validate("x", "S")
        );
    }

    #[test]
    fn tokenize_free_function() {
        let grammar = sample();
        assert_eq!(
            tokenize("abb", &grammar),
            Ok(vec![Symbol::from("a"), Symbol::from("b"), Symbol::from("b")])
        );
        assert_eq!(
            tokenize("c", &grammar),
            Err(Error::UnrecognizedInput { offset: 0 })
        );
    }

    #[test]
    fn recognizer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Recognizer>();
    }
}
