//! Grammar module holding the immutable rule set every other component reads.
//!
//! A [`Grammar`] maps each nonterminal to a non-empty list of
//! [`Production`]s. Any symbol that appears in a production but has no rule
//! of its own is a terminal. Rules keep their declaration order, which is
//! the tie-break wherever order is observable: the first start candidate,
//! and which nonterminal wins when two rules share a production during
//! reduction.
//!
//! # Examples
//!
//! ```rust
//! use cfg_engine::Grammar;
//!
//! let grammar: Grammar = "S -> A B
//! A -> a
//! B -> b | bb".parse().unwrap();
//!
//! assert!(grammar.is_nonterminal("A"));
//! assert!(grammar.is_terminal("bb"));
//! assert_eq!(grammar.start_symbol().unwrap().as_str(), "S");
//! ```

use crate::error::Error;
use crate::parsers;
use crate::production::Production;
use crate::symbol::Symbol;
use crate::{HashMap, HashSet};

use std::fmt;
use std::str;

/// A nonterminal together with the productions it can expand into.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rule {
    /// the "left hand side" nonterminal
    pub lhs: Symbol,
    productions: Vec<Production>,
}

impl Rule {
    /// Construct a `Rule` from its nonterminal and `Production`s
    #[must_use]
    pub const fn from_parts(lhs: Symbol, productions: Vec<Production>) -> Self {
        Self { lhs, productions }
    }

    /// Get iterator of the `Rule`'s `Production`s
    pub fn productions_iter(&self) -> impl Iterator<Item = &Production> {
        self.productions.iter()
    }

    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lhs = Production::from_parts(vec![self.lhs.clone()]);
        write!(
            f,
            "{lhs} -> {}",
            self.productions
                .iter()
                .map(std::string::ToString::to_string)
                .collect::<Vec<_>>()
                .join(" | ")
        )
    }
}

/// An immutable context-free grammar.
///
/// Construct one with [`Grammar::from_rules`], by parsing the text notation
/// (see [`str::FromStr`]), or from JSON with [`Grammar::from_json`]. Repeated
/// rules for the same nonterminal are merged, keeping the position of the
/// first declaration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Grammar {
    rules: Vec<Rule>,
    index: HashMap<Symbol, usize>,
}

impl Grammar {
    /// Build a `Grammar` from rules.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyRule` if a nonterminal ends up with no productions.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Result<Self, Error> {
        let mut merged: Vec<Rule> = vec![];
        let mut index: HashMap<Symbol, usize> = HashMap::new();

        for rule in rules {
            if let Some(&idx) = index.get(&rule.lhs) {
                if let Some(existing) = merged.get_mut(idx) {
                    existing.productions.extend(rule.productions);
                }
            } else {
                index.insert(rule.lhs.clone(), merged.len());
                merged.push(rule);
            }
        }

        if let Some(empty) = merged.iter().find(|rule| rule.productions.is_empty()) {
            return Err(Error::EmptyRule(empty.lhs.to_string()));
        }

        Ok(Self {
            rules: merged,
            index,
        })
    }

    /// Build a `Grammar` from `(nonterminal, productions)` pairs of plain strings,
    /// the same shape as the JSON form.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyRule` if a nonterminal has no productions.
    pub fn from_pairs<'s, P>(pairs: impl IntoIterator<Item = (&'s str, P)>) -> Result<Self, Error>
    where
        P: IntoIterator,
        P::Item: IntoIterator<Item = &'s str>,
    {
        Self::from_rules(pairs.into_iter().map(|(lhs, productions)| {
            Rule::from_parts(
                Symbol::from(lhs),
                productions
                    .into_iter()
                    .map(|symbols| symbols.into_iter().collect())
                    .collect(),
            )
        }))
    }

    /// Parse a grammar from its JSON form, an object mapping each nonterminal
    /// to a list of productions, each a list of symbols:
    /// `{"S": [["a", "S", "b"], ["c"]]}`. Key order is kept.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseError` for malformed JSON and `Error::EmptyRule`
    /// for a nonterminal mapped to an empty list.
    #[cfg(feature = "serde")]
    pub fn from_json(input: &str) -> Result<Self, Error> {
        let rules: json::OrderedRules = serde_json::from_str(input)?;
        Self::from_rules(rules.0)
    }

    /// Render the grammar in its JSON form
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseError` if serialization fails.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Get iterator of the `Grammar`'s `Rule`s in declaration order
    pub fn rules_iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Get iterator of the nonterminals in declaration order
    pub fn nonterminals_iter(&self) -> impl Iterator<Item = &Symbol> {
        self.rules.iter().map(|rule| &rule.lhs)
    }

    /// Get the `Rule` for a nonterminal
    #[must_use]
    pub fn rule(&self, nonterminal: &str) -> Option<&Rule> {
        self.index
            .get(nonterminal)
            .and_then(|&idx| self.rules.get(idx))
    }

    /// Get the `Production`s of a nonterminal, `None` for anything else
    #[must_use]
    pub fn productions(&self, nonterminal: &str) -> Option<&[Production]> {
        self.rule(nonterminal).map(Rule::productions)
    }

    /// Number of nonterminals
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether the symbol has a rule of its own
    #[must_use]
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// Whether the symbol appears in some production without having a rule
    #[must_use]
    pub fn is_terminal(&self, symbol: &str) -> bool {
        !self.is_nonterminal(symbol)
            && self
                .rhs_symbols()
                .any(|candidate| candidate.as_str() == symbol)
    }

    /// Every symbol occurrence on a right hand side, with repeats
    pub(crate) fn rhs_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.rules
            .iter()
            .flat_map(|rule| rule.productions.iter())
            .flat_map(Production::symbols_iter)
    }

    /// The first start candidate in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoStartSymbol` if every nonterminal is produced by some rule.
    pub fn start_symbol(&self) -> Result<&Symbol, Error> {
        let referenced: HashSet<&str> = self.rhs_symbols().map(Symbol::as_str).collect();
        self.nonterminals_iter()
            .find(|nt| !referenced.contains(nt.as_str()))
            .ok_or(Error::NoStartSymbol)
    }

    /// Compile a reusable [`crate::Recognizer`] for validating many inputs.
    #[must_use]
    pub fn build_recognizer(&self) -> crate::Recognizer {
        crate::Recognizer::new(self)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{}",
            self.rules
                .iter()
                .map(std::string::ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        )
    }
}

impl str::FromStr for Grammar {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parsers::grammar_complete(s) {
            Result::Ok((_, o)) => Self::from_rules(
                o.into_iter()
                    .map(|(lhs, rhs)| Rule::from_parts(lhs, rhs)),
            ),
            Result::Err(e) => Err(Error::from(e)),
        }
    }
}

#[cfg(feature = "serde")]
mod json {
    use super::{Grammar, Rule};
    use crate::production::Production;
    use crate::symbol::Symbol;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    /// Rules read from a JSON object in document order
    pub(super) struct OrderedRules(pub Vec<Rule>);

    struct OrderedRulesVisitor;

    impl<'de> Visitor<'de> for OrderedRulesVisitor {
        type Value = OrderedRules;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "an object mapping nonterminals to lists of productions")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut rules = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((lhs, productions)) = map.next_entry::<Symbol, Vec<Production>>()? {
                rules.push(Rule::from_parts(lhs, productions));
            }
            Ok(OrderedRules(rules))
        }
    }

    impl<'de> Deserialize<'de> for OrderedRules {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(OrderedRulesVisitor)
        }
    }

    impl Serialize for Grammar {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for rule in self.rules_iter() {
                map.serialize_entry(&rule.lhs, rule.productions())?;
            }
            map.end()
        }
    }

    impl<'de> Deserialize<'de> for Grammar {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let rules = OrderedRules::deserialize(deserializer)?;
            Grammar::from_rules(rules.0).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

    fn sample() -> Grammar {
        "S -> A B
        A -> a
        B -> b | bb"
            .parse()
            .unwrap()
    }

    #[derive(Clone, Debug)]
    struct ArbitraryGrammar(Grammar);

    impl Arbitrary for ArbitraryGrammar {
        fn arbitrary(g: &mut Gen) -> Self {
            let names = [
                "S", "T", "U", "x", "y", "a b", "", "ε", "it's", "|", "'x\"", "\\", "#",
            ];
            let rule_count = usize::arbitrary(g) % 4 + 1;
            let rules = (0..rule_count).map(|idx| {
                let alt_count = usize::arbitrary(g) % 3 + 1;
                let productions = (0..alt_count)
                    .map(|_| {
                        let len = usize::arbitrary(g) % 4;
                        (0..len)
                            .map(|_| *g.choose(&names).unwrap_or(&"x"))
                            .collect::<Production>()
                    })
                    .collect();
                Rule::from_parts(Symbol::new(format!("N{idx}")), productions)
            });
            Self(Grammar::from_rules(rules).unwrap())
        }
    }

    fn prop_to_string_and_back(gram: ArbitraryGrammar) -> TestResult {
        let to_string = gram.0.to_string();
        let from_str: Result<Grammar, _> = to_string.parse();
        match from_str {
            Ok(from_gram) => TestResult::from_bool(from_gram == gram.0),
            _ => TestResult::error(format!("{to_string} to string and back should be safe")),
        }
    }

    #[test]
    fn to_string_and_back() {
        QuickCheck::new()
            .tests(500)
            .r#gen(Gen::new(12usize))
            .quickcheck(prop_to_string_and_back as fn(ArbitraryGrammar) -> TestResult);
    }

    #[test]
    fn symbol_with_both_quotes_round_trips() {
        let grammar = Grammar::from_pairs([("S", [vec!["'x\"", "T"]]), ("T", [vec!["\\"]])]).unwrap();
        let text = grammar.to_string();
        assert_eq!(text, "S -> '\\'x\"' T\nT -> \\\n");
        assert_eq!(text.parse::<Grammar>().unwrap(), grammar);
    }

    #[test]
    fn repeated_rules_merge() {
        let grammar: Grammar = "S -> a\nT -> t\nS -> b".parse().unwrap();
        assert_eq!(grammar.len(), 2);
        assert_eq!(grammar.productions("S").map(<[_]>::len), Some(2));
        let order: Vec<_> = grammar.nonterminals_iter().map(Symbol::as_str).collect();
        assert_eq!(order, vec!["S", "T"]);
    }

    #[test]
    fn empty_rule_is_rejected() {
        let rule = Rule::from_parts(Symbol::from("S"), vec![]);
        assert_eq!(
            Grammar::from_rules([rule]),
            Err(Error::EmptyRule(String::from("S")))
        );
    }

    #[test]
    fn terminal_and_nonterminal_queries() {
        let grammar = sample();
        assert!(grammar.is_nonterminal("S"));
        assert!(!grammar.is_terminal("S"));
        assert!(grammar.is_terminal("bb"));
        assert!(!grammar.is_terminal("z"));
        assert!(!grammar.is_nonterminal("z"));
    }

    #[test]
    fn start_symbol_in_declaration_order() {
        let grammar: Grammar = "A -> a\nS -> A\nT -> A".parse().unwrap();
        assert_eq!(grammar.start_symbol().map(Symbol::as_str), Ok("S"));
    }

    #[test]
    fn no_start_symbol() {
        let grammar: Grammar = "S -> a S b | c".parse().unwrap();
        assert_eq!(grammar.start_symbol(), Err(Error::NoStartSymbol));
    }

    #[test]
    fn from_pairs_matches_text() {
        let grammar = Grammar::from_pairs([
            ("S", vec![vec!["A", "B"]]),
            ("A", vec![vec!["a"]]),
            ("B", vec![vec!["b"], vec!["bb"]]),
        ])
        .unwrap();
        assert_eq!(grammar, sample());
    }

    #[test]
    fn format_grammar() {
        let grammar: Grammar = "S -> 'a b' S | ε\n".parse().unwrap();
        insta::assert_snapshot!(grammar.to_string().trim_end(), @"S -> 'a b' S | ε");
    }

    #[test]
    fn parse_error() {
        let grammar: Result<Grammar, _> = "S -> a |".parse();
        assert!(matches!(grammar, Err(Error::ParseError(_))), "{grammar:?}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_keeps_key_order() {
        let grammar =
            Grammar::from_json(r#"{"S": [["A", "B"]], "A": [["a"]], "B": [["b"], ["bb"]]}"#)
                .unwrap();
        assert_eq!(grammar, sample());
        let order: Vec<_> = grammar.nonterminals_iter().map(Symbol::as_str).collect();
        assert_eq!(order, vec!["S", "A", "B"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip() {
        let grammar = sample();
        let json = grammar.to_json().unwrap();
        assert_eq!(json, r#"{"S":[["A","B"]],"A":[["a"]],"B":[["b"],["bb"]]}"#);
        assert_eq!(Grammar::from_json(&json).unwrap(), grammar);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_errors() {
        assert!(matches!(
            Grammar::from_json(r#"{"S": "a"}"#),
            Err(Error::ParseError(_))
        ));
        assert_eq!(
            Grammar::from_json(r#"{"S": []}"#),
            Err(Error::EmptyRule(String::from("S")))
        );
    }
}
