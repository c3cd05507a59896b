//! Earley chart recognition over the raw input string.
//!
//! Terminals are scanned straight off the input with `starts_with`, so
//! overlapping terminals never need an up-front tokenization. Nullable
//! nonterminals are stepped over during prediction, which keeps empty
//! completions from being missed.

use super::grammar::{CompiledGrammar, ProductionId, SymbolId};
use crate::{HashSet, tracing};
use std::collections::VecDeque;

/// A production with a dot marking how much of it has been matched, and the
/// input offset its match started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Item {
    prod: ProductionId,
    dot: usize,
    origin: usize,
}

impl Item {
    const fn advance(self) -> Self {
        Self {
            dot: self.dot + 1,
            ..self
        }
    }
}

/// Items found at one input offset, with repetitions ignored.
#[derive(Debug, Default)]
struct ItemSet {
    seen: HashSet<Item>,
    items: Vec<Item>,
}

impl ItemSet {
    fn push(&mut self, item: Item) {
        if self.seen.insert(item) {
            self.items.push(item);
        }
    }
    fn contains(&self, item: &Item) -> bool {
        self.seen.contains(item)
    }
}

/// The chart: one [`ItemSet`] per byte offset, visited in increasing order.
#[derive(Debug)]
struct Chart {
    sets: Vec<ItemSet>,
    /// Offsets with a non-empty set still to process
    pending: VecDeque<usize>,
}

impl Chart {
    fn new(input_len: usize) -> Self {
        let mut sets = vec![];
        sets.resize_with(input_len + 1, ItemSet::default);
        Self {
            sets,
            pending: VecDeque::new(),
        }
    }

    fn add(&mut self, offset: usize, item: Item) {
        let Some(set) = self.sets.get_mut(offset) else {
            return;
        };
        if set.items.is_empty() {
            let at = self.pending.partition_point(|&pending| pending < offset);
            if self.pending.get(at) != Some(&offset) {
                self.pending.insert(at, offset);
            }
        }
        set.push(item);
    }

    fn item(&self, offset: usize, idx: usize) -> Option<Item> {
        self.sets.get(offset)?.items.get(idx).copied()
    }

    fn items_at(&self, offset: usize) -> &[Item] {
        self.sets
            .get(offset)
            .map(|set| set.items.as_slice())
            .unwrap_or_default()
    }

    fn contains(&self, offset: usize, item: &Item) -> bool {
        self.sets.get(offset).is_some_and(|set| set.contains(item))
    }
}

/// Whether `start` derives exactly `input`.
pub(crate) fn recognize(grammar: &CompiledGrammar, input: &str, start: SymbolId) -> bool {
    let _span = tracing::span!(tracing::Level::DEBUG, "earley::recognize").entered();
    let mut chart = Chart::new(input.len());

    for prod in grammar.productions_by_lhs(start) {
        chart.add(
            0,
            Item {
                prod: prod.id,
                dot: 0,
                origin: 0,
            },
        );
    }

    while let Some(offset) = chart.pending.pop_front() {
        let mut idx = 0;
        while let Some(item) = chart.item(offset, idx) {
            idx += 1;
            let Some(prod) = grammar.production(item.prod) else {
                continue;
            };

            match prod.rhs_at(item.dot) {
                // complete
                None => {
                    let waiting: Vec<Item> = chart
                        .items_at(item.origin)
                        .iter()
                        .filter(|parent| {
                            grammar
                                .production(parent.prod)
                                .and_then(|parent_prod| parent_prod.rhs_at(parent.dot))
                                == Some(prod.lhs)
                        })
                        .map(|parent| parent.advance())
                        .collect();
                    for parent in waiting {
                        chart.add(offset, parent);
                    }
                }
                // predict
                Some(next) if grammar.is_nonterminal(next) => {
                    for predicted in grammar.productions_by_lhs(next) {
                        chart.add(
                            offset,
                            Item {
                                prod: predicted.id,
                                dot: 0,
                                origin: offset,
                            },
                        );
                    }
                    if grammar.is_nullable(next) {
                        chart.add(offset, item.advance());
                    }
                }
                // scan
                Some(next) => {
                    let Some(terminal) = grammar.symbol(next) else {
                        continue;
                    };
                    let rest = input.get(offset..).unwrap_or_default();
                    if rest.starts_with(terminal.as_str()) {
                        chart.add(offset + terminal.as_str().len(), item.advance());
                    }
                }
            }
        }
    }

    let accepted = grammar.productions_by_lhs(start).any(|prod| {
        chart.contains(
            input.len(),
            &Item {
                prod: prod.id,
                dot: prod.rhs.len(),
                origin: 0,
            },
        )
    });
    tracing::event!(tracing::Level::DEBUG, "accepted: {accepted}");
    accepted
}
