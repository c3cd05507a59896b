use crate::error::Error;
use crate::parsers;
use crate::symbol::Symbol;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One ordered right-hand-side alternative for expanding a nonterminal.
///
/// An empty `Production` derives the empty string.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize), serde(transparent))]
pub struct Production {
    symbols: Vec<Symbol>,
}

impl Production {
    /// Construct an empty `Production`
    #[must_use]
    pub const fn new() -> Self {
        Self { symbols: vec![] }
    }

    /// Construct a `Production` from `Symbol`s
    #[must_use]
    pub const fn from_parts(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Get iterator of the `Production`'s `Symbol`s
    pub fn symbols_iter(&self) -> impl DoubleEndedIterator<Item = &Symbol> {
        self.symbols.iter()
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Get number of `Symbol`s
    #[must_use]
    pub const fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<S: Into<Symbol>> FromIterator<S> for Production {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::from_parts(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.symbols.is_empty() {
            return write!(f, "ε");
        }
        let mut first = true;
        for symbol in &self.symbols {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write_symbol(f, symbol)?;
        }
        Ok(())
    }
}

/// Write `symbol` bare when the parser reads it back unchanged, otherwise
/// quoted with `\` escaping the backslash and the quote character.
fn write_symbol(f: &mut fmt::Formatter, symbol: &Symbol) -> fmt::Result {
    if symbol.is_bare() {
        return write!(f, "{symbol}");
    }
    let text = symbol.as_str();
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{quote}")?;
    for c in text.chars() {
        if c == '\\' || c == quote {
            write!(f, "\\")?;
        }
        write!(f, "{c}")?;
    }
    write!(f, "{quote}")
}

impl FromStr for Production {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parsers::production_complete(s) {
            Result::Ok((_, o)) => Ok(o),
            Result::Err(e) => Err(Error::from(e)),
        }
    }
}
