//! Longest derivation analysis.
//!
//! Lengths are resolved as a fixed point over a work-list of nonterminals:
//! a nonterminal is resolved once every symbol in every one of its
//! productions has a known length. A full pass that resolves nothing means
//! the remaining nonterminals depend on a cycle.

use crate::error::Error;
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::{HashMap, HashSet, tracing};
use std::collections::VecDeque;

/// The maximum length, in chars, of any sentence derivable from `symbol`.
///
/// A terminal measures its own length, so `{"S": [["A","B"]], "A": [["a"]],
/// "B": [["b"],["bb"]]}` gives 3 for `S`.
///
/// # Errors
///
/// Returns `Error::UnknownSymbol` if `symbol` is neither a nonterminal nor
/// a terminal of the grammar, and `Error::CyclicGrammar` if resolving it
/// runs into a cycle.
pub fn longest_sequence(symbol: &str, grammar: &Grammar) -> Result<usize, Error> {
    longest_with(symbol, grammar, Symbol::char_len)
}

/// The maximum number of terminal symbols in any derivation from `symbol`.
///
/// # Errors
///
/// Same as [`longest_sequence`].
pub fn longest_terminal_count(symbol: &str, grammar: &Grammar) -> Result<usize, Error> {
    longest_with(symbol, grammar, |_| 1)
}

fn longest_with(
    symbol: &str,
    grammar: &Grammar,
    weight: impl Fn(&Symbol) -> usize,
) -> Result<usize, Error> {
    let _span = tracing::span!(tracing::Level::DEBUG, "longest_sequence").entered();

    let mut lengths: HashMap<&str, usize> = grammar
        .rhs_symbols()
        .filter(|s| !grammar.is_nonterminal(s.as_str()))
        .map(|s| (s.as_str(), weight(s)))
        .collect();

    if !grammar.is_nonterminal(symbol) {
        return lengths
            .get(symbol)
            .copied()
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_owned()));
    }

    let mut pending: VecDeque<&Symbol> = grammar.nonterminals_iter().collect();
    let mut pass = 0usize;

    loop {
        pass += 1;
        let mut progress = false;

        for _ in 0..pending.len() {
            let Some(nt) = pending.pop_front() else {
                break;
            };
            let productions = grammar.productions(nt.as_str()).unwrap_or_default();

            let resolved = productions
                .iter()
                .map(|production| {
                    production
                        .symbols_iter()
                        .map(|s| lengths.get(s.as_str()).copied())
                        .try_fold(0usize, |sum, len| len.map(|len| sum.saturating_add(len)))
                })
                .try_fold(0usize, |longest, sum| sum.map(|sum| longest.max(sum)));

            match resolved {
                Some(len) => {
                    tracing::event!(tracing::Level::TRACE, "pass {pass}: {nt} = {len}");
                    if nt.as_str() == symbol {
                        return Ok(len);
                    }
                    lengths.insert(nt.as_str(), len);
                    progress = true;
                }
                None => pending.push_back(nt),
            }
        }

        if !progress {
            let unresolved = unresolved_from(symbol, grammar, &lengths);
            tracing::event!(
                tracing::Level::DEBUG,
                "no progress after {pass} passes, unresolved: {}",
                unresolved.join(", ")
            );
            return Err(Error::CyclicGrammar(unresolved));
        }
    }
}

/// Unresolved nonterminals reachable from `symbol`, in declaration order.
fn unresolved_from(symbol: &str, grammar: &Grammar, lengths: &HashMap<&str, usize>) -> Vec<String> {
    let mut reachable: HashSet<&str> = HashSet::new();
    let mut frontier = vec![symbol];
    while let Some(nt) = frontier.pop() {
        if lengths.contains_key(nt) || !reachable.insert(nt) {
            continue;
        }
        let next = grammar
            .productions(nt)
            .unwrap_or_default()
            .iter()
            .flat_map(|production| production.symbols_iter())
            .map(Symbol::as_str)
            .filter(|s| grammar.is_nonterminal(s));
        frontier.extend(next);
    }

    grammar
        .nonterminals_iter()
        .filter(|nt| reachable.contains(nt.as_str()))
        .map(ToString::to_string)
        .collect()
}
