use std::error;
use std::fmt;
use std::str;

use nom::{Err, error::ErrorKind};

#[derive(PartialEq, Eq, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Grammar text or JSON could not be read
    ParseError(String),
    /// A nonterminal was declared without any production
    EmptyRule(String),
    /// Every nonterminal is produced by some other rule
    NoStartSymbol,
    /// Symbol is neither a grammar key nor a terminal
    UnknownSymbol(String),
    /// Length analysis stopped making progress; holds the unresolved nonterminals
    CyclicGrammar(Vec<String>),
    /// Derivation tree grew deeper than the configured budget
    DepthExceeded { limit: usize },
    /// Generated text grew longer than the configured budget
    LengthExceeded { limit: usize },
    /// No terminal matches the input at this char offset
    UnrecognizedInput { offset: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(s) => write!(f, "{s}"),
            Error::EmptyRule(nt) => write!(f, "Nonterminal '{nt}' has no productions"),
            Error::NoStartSymbol => write!(
                f,
                "Grammar has no start symbol, every nonterminal is produced by another rule"
            ),
            Error::UnknownSymbol(s) => write!(f, "Unknown symbol '{s}'"),
            Error::CyclicGrammar(unresolved) => {
                write!(f, "Grammar is cyclic, unresolved: {}", unresolved.join(", "))
            }
            Error::DepthExceeded { limit } => {
                write!(f, "Generation exceeded the depth limit of {limit}")
            }
            Error::LengthExceeded { limit } => {
                write!(f, "Generation exceeded the length limit of {limit}")
            }
            Error::UnrecognizedInput { offset } => {
                write!(f, "No terminal matches input at offset {offset}")
            }
        }
    }
}

impl error::Error for Error {}

impl From<nom::error::Error<&str>> for Error {
    fn from(err: nom::error::Error<&str>) -> Self {
        Error::ParseError(format!("Parsing error: {err:?}"))
    }
}

impl From<Err<nom::error::Error<&str>>> for Error {
    fn from(err: Err<nom::error::Error<&str>>) -> Self {
        Error::ParseError(format!("Parsing error: {err:?}"))
    }
}

impl From<(&'_ str, ErrorKind)> for Error {
    fn from(err: (&str, ErrorKind)) -> Self {
        let string = format!("Parsing error: {:?}\n {:?}", err.1, err.0);
        Error::ParseError(string)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(format!("JSON error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use nom::{Err, IResult, Parser, bytes::complete::tag};

    fn give_error_kind(input: &str) -> IResult<&str, &str> {
        let (input, _) = tag("S").parse(input)?;
        let (input, res) = tag("->").parse(input)?;
        Ok((input, res))
    }

    #[test]
    fn gets_error_on_incomplete() {
        let nom_result = give_error_kind("").map_err(Error::from);
        assert!(matches!(nom_result, Err(Error::ParseError(_))));
    }

    #[test]
    fn from_nom_err_failure() {
        let error = nom::error::Error::new("test", nom::error::ErrorKind::Tag);
        let err = Err::Failure(error);
        let cfg_error = Error::from(err);
        assert!(matches!(cfg_error, Error::ParseError(_)));
        assert!(cfg_error.to_string().contains("Parsing error:"));
    }

    #[test]
    fn from_str_and_nom_error_kind() {
        let error_kind = nom::error::ErrorKind::Char;
        assert!(matches!(
            Error::from(("anything", error_kind)),
            Error::ParseError(_)
        ));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            Error::CyclicGrammar(vec![String::from("S"), String::from("T")]).to_string(),
            "Grammar is cyclic, unresolved: S, T"
        );
        assert_eq!(
            Error::DepthExceeded { limit: 8 }.to_string(),
            "Generation exceeded the depth limit of 8"
        );
        assert_eq!(
            Error::UnknownSymbol(String::from("Z")).to_string(),
            "Unknown symbol 'Z'"
        );
        assert_eq!(
            Error::UnrecognizedInput { offset: 3 }.to_string(),
            "No terminal matches input at offset 3"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(Error::from(err), Error::ParseError(_)));
    }

    #[test]
    fn error_trait_impl() {
        let error = Error::NoStartSymbol;
        let error_ref: &dyn std::error::Error = &error;
        assert!(error_ref.to_string().contains("no start symbol"));
    }
}
