#![doc = include_str!("../README.md")]

mod append_vec;
mod classify;
mod error;
mod generate;
mod grammar;
mod length;
mod parsers;
mod production;
mod recognize;
mod symbol;
mod tracing;

pub use crate::classify::{Classification, classify, start_symbols, terminal_symbols};
pub use crate::error::Error;
pub use crate::generate::{GenerateOptions, Generator, generate};
pub use crate::grammar::{Grammar, Rule};
pub use crate::length::{longest_sequence, longest_terminal_count};
pub use crate::production::Production;
pub use crate::recognize::{
    ReductionConflict, Rejection, Recognizer, Strategy, tokenize, validate,
};
pub use crate::symbol::Symbol;

pub(crate) use hashbrown::{HashMap, HashSet};

pub use rand;
