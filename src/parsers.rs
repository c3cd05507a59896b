//! nom parsers for the line-oriented grammar notation:
//!
//! ```text
//! # comments run to the end of the line
//! S -> A B
//! A -> a
//! B -> b | bb ; C -> 'quoted text' | ε
//! ```
//!
//! Symbols are separated by whitespace. A symbol containing whitespace, `|`,
//! `;` or a quote character, or the empty symbol, is written quoted with `'`
//! or `"`. Inside quotes `\` escapes `\`, `'` and `"`. A lone `ε` is the empty
//! production.

use crate::production::Production;
use crate::symbol::Symbol;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_till, take_till1},
    character::complete::{self, line_ending, multispace0, space0},
    combinator::{all_consuming, eof, map, opt, peek, value, verify},
    error::Error,
    multi::{many1, separated_list1},
    sequence::{delimited, preceded, terminated},
};

pub(crate) type ParsedRule = (Symbol, Vec<Production>);

fn comment(input: &str) -> IResult<&str, &str> {
    preceded(
        complete::char('#'),
        take_till(|c: char| c == '\r' || c == '\n'),
    )
    .parse(input)
}

///this should never fail, unwrap it when calling directly please!
pub fn whitespace_plus_comments(mut input: &str) -> IResult<&str, char> {
    let mut old_input = input;
    loop {
        (input, _) = multispace0::<&str, nom::error::Error<&str>>.parse(input)?;
        (input, _) = opt(comment).parse(input)?;

        if input == old_input {
            break;
        }
        old_input = input;
    }
    Ok((input, '\0'))
}

/// Text between `quote` characters, with `\` escaping `\`, `'` and `"`.
fn quoted_text<'a>(quote: char) -> impl Parser<&'a str, Output = String, Error = Error<&'a str>> {
    let normal = if quote == '"' { "\\\"" } else { "\\'" };
    map(
        opt(escaped_transform(
            is_not(normal),
            '\\',
            alt((
                value("\\", tag("\\")),
                value("'", tag("'")),
                value("\"", tag("\"")),
            )),
        )),
        Option::unwrap_or_default,
    )
}

fn quoted(input: &str) -> IResult<&str, String> {
    alt((
        delimited(complete::char('"'), quoted_text('"'), complete::char('"')),
        delimited(complete::char('\''), quoted_text('\''), complete::char('\'')),
    ))
    .parse(input)
}

fn bare(input: &str) -> IResult<&str, &str> {
    verify(
        take_till1(|c: char| c.is_whitespace() || c == '|' || c == ';'),
        |s: &str| s != "->" && !s.starts_with(['#', '\'', '"']),
    )
    .parse(input)
}

pub fn symbol(input: &str) -> IResult<&str, Symbol> {
    alt((map(quoted, Symbol::from), map(bare, Symbol::from))).parse(input)
}

fn alternative_end(input: &str) -> IResult<&str, &str> {
    alt((tag("|"), tag(";"), tag("#"), line_ending, eof)).parse(input)
}

fn epsilon(input: &str) -> IResult<&str, Production> {
    let (input, _) = terminated(tag("ε"), space0).parse(input)?;
    let (input, _) = peek(alternative_end).parse(input)?;
    Ok((input, Production::new()))
}

pub fn production(input: &str) -> IResult<&str, Production> {
    let (input, _) = space0.parse(input)?;
    if let Ok(parsed) = epsilon(input) {
        return Ok(parsed);
    }
    let (input, symbols) = many1(terminated(symbol, space0)).parse(input)?;
    Ok((input, Production::from_parts(symbols)))
}

pub fn production_complete(input: &str) -> IResult<&str, Production> {
    all_consuming(terminated(production, space0)).parse(input)
}

fn rule_end(input: &str) -> IResult<&str, &str> {
    let (input, _) = space0.parse(input)?;
    let (input, _) = opt(comment).parse(input)?;
    alt((line_ending, tag(";"), eof)).parse(input)
}

pub fn rule(input: &str) -> IResult<&str, ParsedRule> {
    let (input, lhs) = delimited(space0, symbol, space0).parse(input)?;
    let (input, _) = terminated(tag("->"), space0).parse(input)?;
    let (input, rhs) = separated_list1(
        delimited(space0, complete::char('|'), space0),
        production,
    )
    .parse(input)?;
    let (input, _) = rule_end(input)?;
    Ok((input, (lhs, rhs)))
}

pub fn grammar(input: &str) -> IResult<&str, Vec<ParsedRule>> {
    let mut rules = vec![];
    let (mut input, _) = whitespace_plus_comments(input)?;
    while !input.is_empty() {
        let (rest, parsed) = rule(input)?;
        rules.push(parsed);
        (input, _) = whitespace_plus_comments(rest)?;
    }
    Ok((input, rules))
}

pub fn grammar_complete(input: &str) -> IResult<&str, Vec<ParsedRule>> {
    all_consuming(grammar).parse(input)
}
