//! Bottom-up recognition by repeated reduction passes.
//!
//! A pass reads an input tape left to right. At each position it replaces a
//! window of symbols equal to some production's right-hand side by that
//! production's left-hand side, writing it to an output tape. A pass that
//! consumes the whole input tape either accepts, when the output tape is
//! exactly the start symbol, or feeds its output tape to a new pass.
//! Every choice of window is explored.

use super::grammar::{CompiledGrammar, SymbolId};
use crate::symbol::Symbol;
use crate::{HashMap, HashSet, tracing};
use std::rc::Rc;

/// Two rules share a right-hand side; reductions use the later one.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ReductionConflict {
    /// The shared right-hand side
    pub rhs: Vec<Symbol>,
    /// Nonterminal whose reduction is no longer reachable
    pub shadowed: Symbol,
    /// Nonterminal every match of `rhs` reduces to
    pub reduces_to: Symbol,
}

/// Right-hand sides mapped back to the nonterminal they reduce to.
#[derive(Debug, Default)]
pub(crate) struct ReductionIndex {
    lhs_by_rhs: HashMap<Box<[SymbolId]>, SymbolId>,
    /// Longest indexed right-hand side, in symbols
    window: usize,
    conflicts: Vec<ReductionConflict>,
}

impl ReductionIndex {
    pub fn new(grammar: &CompiledGrammar) -> Self {
        let _span = tracing::span!(tracing::Level::DEBUG, "ReductionIndex::new").entered();
        let mut index = Self::default();

        for prod in grammar.productions_iter().filter(|prod| !prod.rhs.is_empty()) {
            index.window = index.window.max(prod.rhs.len());
            let previous = index.lhs_by_rhs.insert(prod.rhs.clone().into(), prod.lhs);

            let Some(previous) = previous.filter(|&previous| previous != prod.lhs) else {
                continue;
            };
            let name = |id| grammar.symbol(id).cloned().unwrap_or_default();
            let conflict = ReductionConflict {
                rhs: prod.rhs.iter().map(|&id| name(id)).collect(),
                shadowed: name(previous),
                reduces_to: name(prod.lhs),
            };
            tracing::event!(
                tracing::Level::WARN,
                "reduction to {} shadowed by {}",
                conflict.shadowed,
                conflict.reduces_to
            );
            index.conflicts.push(conflict);
        }

        index
    }

    pub fn conflicts(&self) -> &[ReductionConflict] {
        &self.conflicts
    }

    fn lookup(&self, window: &[SymbolId]) -> Option<SymbolId> {
        self.lhs_by_rhs.get(window).copied()
    }
}

/// One pass in progress: the tape being read, how far, and what was written.
#[derive(Debug)]
struct Pass {
    input: Rc<[SymbolId]>,
    pos: usize,
    output: Vec<SymbolId>,
}

/// Remembers tapes that already started a pass. A tape's outcome does not
/// depend on how it was reached, so a repeated tape never needs a second
/// look, which also stops reduction cycles such as `A -> B`, `B -> A`.
#[derive(Debug, Default)]
pub(crate) struct SeenTapes(HashSet<Vec<SymbolId>>);

impl SeenTapes {
    fn first_visit(&mut self, tape: &[SymbolId]) -> bool {
        if self.0.contains(tape) {
            return false;
        }
        self.0.insert(tape.to_vec())
    }
}

/// Whether `tape` reduces to exactly `[start]`.
///
/// Explores depth first with an explicit stack, shorter windows before
/// longer ones, and a finished pass before its siblings.
pub(crate) fn reduces_to(
    index: &ReductionIndex,
    tape: Vec<SymbolId>,
    start: SymbolId,
    seen: &mut SeenTapes,
) -> bool {
    if tape.is_empty() || !seen.first_visit(&tape) {
        return false;
    }

    let mut stack = vec![Pass {
        input: tape.into(),
        pos: 0,
        output: vec![],
    }];
    let mut passes = 0usize;

    while let Some(pass) = stack.pop() {
        let rest = pass.input.get(pass.pos..).unwrap_or_default();

        if rest.is_empty() {
            passes += 1;
            if pass.output.as_slice() == [start] {
                tracing::event!(tracing::Level::TRACE, "accepted after {passes} passes");
                return true;
            }
            if !pass.output.is_empty() && seen.first_visit(&pass.output) {
                stack.push(Pass {
                    input: pass.output.into(),
                    pos: 0,
                    output: vec![],
                });
            }
            continue;
        }

        for width in (1..=index.window.min(rest.len())).rev() {
            let Some(lhs) = rest.get(..width).and_then(|window| index.lookup(window)) else {
                continue;
            };
            let mut output = pass.output.clone();
            output.push(lhs);
            stack.push(Pass {
                input: Rc::clone(&pass.input),
                pos: pass.pos + width,
                output,
            });
        }
    }

    tracing::event!(tracing::Level::TRACE, "rejected after {passes} passes");
    false
}
