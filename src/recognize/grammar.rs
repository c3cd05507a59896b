use crate::append_vec::{AppendOnlyVec, append_only_vec_id};
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::{HashMap, HashSet, tracing};

append_only_vec_id!(pub(crate) SymbolId);
append_only_vec_id!(pub(crate) ProductionId);

/// One alternative of a rule, with its symbols interned.
#[derive(Debug)]
pub(crate) struct Production {
    pub id: ProductionId,
    pub lhs: SymbolId,
    pub rhs: Vec<SymbolId>,
}

impl Production {
    pub fn rhs_at(&self, dot: usize) -> Option<SymbolId> {
        self.rhs.get(dot).copied()
    }
}

/// A [`Grammar`] flattened into interned symbols and numbered productions.
///
/// Symbols are interned in the order they are first met: every nonterminal
/// in declaration order, then right-hand side symbols as they appear.
#[derive(Debug, Default)]
pub(crate) struct CompiledGrammar {
    symbols: AppendOnlyVec<Symbol, SymbolId>,
    symbol_ids: HashMap<Symbol, SymbolId>,
    nonterminals: HashSet<SymbolId>,
    nullable: HashSet<SymbolId>,
    productions: AppendOnlyVec<Production, ProductionId>,
    productions_by_lhs: HashMap<SymbolId, Vec<ProductionId>>,
}

impl CompiledGrammar {
    pub fn new(grammar: &Grammar) -> Self {
        let _span = tracing::span!(tracing::Level::DEBUG, "CompiledGrammar::new").entered();
        let mut compiled = Self::default();

        for nonterminal in grammar.nonterminals_iter() {
            let id = compiled.intern(nonterminal);
            compiled.nonterminals.insert(id);
        }

        for rule in grammar.rules_iter() {
            let lhs = compiled.intern(&rule.lhs);
            for production in rule.productions_iter() {
                let rhs = production
                    .symbols_iter()
                    .map(|symbol| compiled.intern(symbol))
                    .collect();
                let id = compiled
                    .productions
                    .push_with_id(|id| Production { id, lhs, rhs });
                compiled.productions_by_lhs.entry(lhs).or_default().push(id);
            }
        }

        compiled.nullable = compiled.find_nullable();
        compiled
    }

    fn intern(&mut self, symbol: &Symbol) -> SymbolId {
        if let Some(&id) = self.symbol_ids.get(symbol) {
            return id;
        }
        let id = self.symbols.push(symbol.clone());
        self.symbol_ids.insert(symbol.clone(), id);
        id
    }

    /// Nonterminals deriving the empty string, plus the empty terminal if used.
    fn find_nullable(&self) -> HashSet<SymbolId> {
        let mut nullable: HashSet<SymbolId> = self
            .symbols_iter()
            .filter(|(id, symbol)| !self.nonterminals.contains(id) && symbol.as_str().is_empty())
            .map(|(id, _)| id)
            .collect();

        loop {
            let found: Vec<SymbolId> = self
                .productions_iter()
                .filter(|prod| !nullable.contains(&prod.lhs))
                .filter(|prod| prod.rhs.iter().all(|id| nullable.contains(id)))
                .map(|prod| prod.lhs)
                .collect();
            if found.is_empty() {
                return nullable;
            }
            nullable.extend(found);
        }
    }

    pub fn symbols_iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(idx, symbol)| (SymbolId::from(idx), symbol))
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn symbol_id(&self, symbol: &str) -> Option<SymbolId> {
        self.symbol_ids.get(symbol).copied()
    }

    /// Id of `symbol` if it names a nonterminal.
    pub fn nonterminal_id(&self, symbol: &str) -> Option<SymbolId> {
        self.symbol_id(symbol).filter(|id| self.is_nonterminal(*id))
    }

    pub fn is_nonterminal(&self, id: SymbolId) -> bool {
        self.nonterminals.contains(&id)
    }

    pub fn is_nullable(&self, id: SymbolId) -> bool {
        self.nullable.contains(&id)
    }

    /// Terminal symbols, in interning order.
    pub fn terminals_iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols_iter()
            .filter(|(id, _)| !self.nonterminals.contains(id))
    }

    pub fn production(&self, id: ProductionId) -> Option<&Production> {
        self.productions.get(id)
    }

    pub fn productions_iter(&self) -> impl Iterator<Item = &Production> {
        self.productions.iter()
    }

    pub fn productions_by_lhs(&self, lhs: SymbolId) -> impl Iterator<Item = &Production> {
        self.productions_by_lhs
            .get(&lhs)
            .into_iter()
            .flatten()
            .filter_map(|id| self.production(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_order() {
        let grammar: Grammar = "S -> a B\nB -> b".parse().unwrap();
        let compiled = CompiledGrammar::new(&grammar);
        let names: Vec<&str> = compiled
            .symbols_iter()
            .map(|(_, symbol)| symbol.as_str())
            .collect();
        assert_eq!(names, vec!["S", "B", "a", "b"]);
        let terminals: Vec<&str> = compiled
            .terminals_iter()
            .map(|(_, symbol)| symbol.as_str())
            .collect();
        assert_eq!(terminals, vec!["a", "b"]);
    }

    #[test]
    fn productions_by_lhs() {
        let grammar: Grammar = "S -> a | b S\nT -> t".parse().unwrap();
        let compiled = CompiledGrammar::new(&grammar);
        let s = compiled.nonterminal_id("S").unwrap();
        assert_eq!(compiled.productions_by_lhs(s).count(), 2);
        assert!(compiled.nonterminal_id("a").is_none());
        assert!(compiled.nonterminal_id("Z").is_none());
    }

    #[test]
    fn nullable_nonterminals() {
        let grammar: Grammar = "S -> A B\nA -> ε | a\nB -> A A\nC -> c".parse().unwrap();
        let compiled = CompiledGrammar::new(&grammar);
        for name in ["S", "A", "B"] {
            let id = compiled.symbol_id(name).unwrap();
            assert!(compiled.is_nullable(id), "{name}");
        }
        let c = compiled.symbol_id("C").unwrap();
        assert!(!compiled.is_nullable(c));
    }

    #[test]
    fn empty_terminal_is_nullable() {
        let grammar: Grammar = "S -> '' x".parse().unwrap();
        let compiled = CompiledGrammar::new(&grammar);
        let empty = compiled.symbol_id("").unwrap();
        assert!(compiled.is_nullable(empty));
        assert!(!compiled.is_nullable(compiled.symbol_id("S").unwrap()));
    }
}
