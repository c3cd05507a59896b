//! Random sentence generation.
//!
//! Expansion walks an explicit stack instead of recursing, leftmost symbol
//! first, so randomness is consumed in the same order a recursive
//! left-to-right expansion would consume it and a seeded RNG always yields
//! the same sentence.

use crate::error::Error;
use crate::grammar::Grammar;
use crate::tracing;
use rand::{Rng, seq::IndexedRandom};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Budgets bounding a single generation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize), serde(default))]
#[non_exhaustive]
pub struct GenerateOptions {
    /// Maximum derivation tree depth; the root nonterminal sits at depth 0
    pub max_depth: usize,
    /// Maximum generated length in chars, unbounded when `None`
    pub max_len: Option<usize>,
}

impl GenerateOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    /// Set the maximum derivation tree depth
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum generated length in chars, or lift it with `None`
    #[must_use]
    pub const fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_len: None,
        }
    }
}

/// Generates sentences from a borrowed [`Grammar`].
///
/// # Example
///
/// ```rust
/// use cfg_engine::{GenerateOptions, Generator, Grammar};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let grammar: Grammar = "dna -> base | base dna
/// base -> A | C | G | T".parse().unwrap();
/// let generator =
///     Generator::new(&grammar).with_options(GenerateOptions::default().with_max_depth(64));
/// let mut rng = StdRng::seed_from_u64(7);
///
/// match generator.generate("dna", &mut rng) {
///     Ok(s) => println!("random sentence: {s}"),
///     Err(e) => println!("something went wrong: {e}!"),
/// }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Generator<'g> {
    grammar: &'g Grammar,
    options: GenerateOptions,
}

impl<'g> Generator<'g> {
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            options: GenerateOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(self, options: GenerateOptions) -> Self {
        Self { options, ..self }
    }

    #[must_use]
    pub const fn options(&self) -> GenerateOptions {
        self.options
    }

    /// Expand `symbol` into a random sentence.
    ///
    /// A symbol without a rule is a terminal and comes back verbatim. For a
    /// nonterminal one production is picked uniformly at random and each of
    /// its symbols is expanded in order.
    ///
    /// # Errors
    ///
    /// Returns `Error::DepthExceeded` or `Error::LengthExceeded` when a
    /// budget from [`GenerateOptions`] runs out.
    pub fn generate<R: Rng + ?Sized>(&self, symbol: &str, rng: &mut R) -> Result<String, Error> {
        let _span = tracing::span!(tracing::Level::DEBUG, "generate").entered();
        let GenerateOptions { max_depth, max_len } = self.options;

        let mut output = String::new();
        let mut output_len = 0usize;
        let mut stack: Vec<(&str, usize)> = vec![(symbol, 0)];

        while let Some((current, depth)) = stack.pop() {
            let Some(productions) = self.grammar.productions(current) else {
                output_len += current.chars().count();
                if let Some(limit) = max_len.filter(|&limit| output_len > limit) {
                    return Err(Error::LengthExceeded { limit });
                }
                output.push_str(current);
                continue;
            };

            if depth >= max_depth {
                tracing::event!(tracing::Level::DEBUG, "depth budget spent at {current}");
                return Err(Error::DepthExceeded { limit: max_depth });
            }

            let Some(production) = productions.choose(rng) else {
                return Err(Error::EmptyRule(current.to_owned()));
            };
            tracing::event!(tracing::Level::TRACE, "expand {current} -> {production}");

            stack.extend(
                production
                    .symbols_iter()
                    .rev()
                    .map(|next| (next.as_str(), depth + 1)),
            );
        }

        Ok(output)
    }

    /// An endless stream of sentences rooted at `symbol`, all drawn from `rng`.
    pub fn samples<'a, R: Rng + ?Sized>(
        &'a self,
        symbol: &'a str,
        rng: &'a mut R,
    ) -> impl Iterator<Item = Result<String, Error>> + 'a {
        std::iter::repeat_with(move || self.generate(symbol, rng))
    }
}

/// Generate one sentence from `symbol` with default budgets.
///
/// # Errors
///
/// Returns `Error::DepthExceeded` if the derivation nests deeper than
/// [`GenerateOptions::DEFAULT_MAX_DEPTH`], which is how cyclic grammars fail.
pub fn generate<R: Rng + ?Sized>(
    symbol: &str,
    grammar: &Grammar,
    rng: &mut R,
) -> Result<String, Error> {
    Generator::new(grammar).generate(symbol, rng)
}
