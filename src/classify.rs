//! Terminal and start-symbol classification.

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::{HashSet, tracing};

/// The terminal and start-candidate sets of a [`Grammar`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Classification {
    pub terminals: HashSet<Symbol>,
    pub starts: HashSet<Symbol>,
}

/// Every symbol used in a production that is not itself a nonterminal.
#[must_use]
pub fn terminal_symbols(grammar: &Grammar) -> HashSet<Symbol> {
    grammar
        .rhs_symbols()
        .filter(|symbol| !grammar.is_nonterminal(symbol.as_str()))
        .cloned()
        .collect()
}

/// Nonterminals that no production refers to.
///
/// Empty when every nonterminal is reachable from another one, so callers
/// must check before picking a root. [`Grammar::start_symbol`] does that
/// check and picks by declaration order.
#[must_use]
pub fn start_symbols(grammar: &Grammar) -> HashSet<Symbol> {
    let referenced: HashSet<&str> = grammar.rhs_symbols().map(Symbol::as_str).collect();
    grammar
        .nonterminals_iter()
        .filter(|nt| !referenced.contains(nt.as_str()))
        .cloned()
        .collect()
}

#[must_use]
pub fn classify(grammar: &Grammar) -> Classification {
    let _span = tracing::span!(tracing::Level::DEBUG, "classify").entered();
    let classification = Classification {
        terminals: terminal_symbols(grammar),
        starts: start_symbols(grammar),
    };
    tracing::event!(
        tracing::Level::DEBUG,
        terminals = classification.terminals.len(),
        starts = classification.starts.len(),
        "classified grammar"
    );
    classification
}
