use std::borrow::Borrow;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An atomic grammar token.
///
/// Whether a `Symbol` is terminal or nonterminal is not a property of the
/// symbol itself but of the [`crate::Grammar`] it is used in: a symbol is a
/// nonterminal exactly when the grammar has a rule for it.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize), serde(transparent))]
pub struct Symbol(String);

impl Symbol {
    /// Construct a new `Symbol`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the symbol text in chars
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the symbol can be written bare in the text notation
    pub(crate) fn is_bare(&self) -> bool {
        !self.0.is_empty()
            && !self.0.starts_with('#')
            && self.0 != "->"
            && self.0 != "ε"
            && !self
                .0
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '|' | ';' | '\'' | '"'))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_len_counts_unicode_scalars() {
        assert_eq!(Symbol::from("bb").char_len(), 2);
        assert_eq!(Symbol::from("αβ").char_len(), 2);
        assert_eq!(Symbol::from("").char_len(), 0);
    }

    #[test]
    fn bare_symbols() {
        assert!(Symbol::from("NP").is_bare());
        assert!(Symbol::from("+").is_bare());
        assert!(!Symbol::from("").is_bare());
        assert!(!Symbol::from("a b").is_bare());
        assert!(!Symbol::from("|").is_bare());
        assert!(!Symbol::from("->").is_bare());
        assert!(!Symbol::from("ε").is_bare());
        assert!(!Symbol::from(";").is_bare());
        assert!(!Symbol::from("'q").is_bare());
        assert!(!Symbol::from("it's").is_bare());
        assert!(!Symbol::from("say\"").is_bare());
        assert!(!Symbol::from("#x").is_bare());
        assert!(Symbol::from("a\\b").is_bare());
    }

    #[test]
    fn borrow_as_str_for_lookups() {
        let mut set = hashbrown::HashSet::new();
        set.insert(Symbol::from("a"));
        assert!(set.contains("a"));
    }
}
