//! Parser combinators over a grammar graph.
//!
//! A grammar is a graph of four kinds of parsers: [`Literal`] and
//! [`Pattern`] leaves, and sequence and alternative combinators whose
//! children are other parsers in the same grammar. Combinators may refer
//! back to themselves, which is how recursive rules are expressed.
//!
//! Every parse runs in one of two [`Mode`]s. In total mode the parser has to
//! consume all of its input, in partial mode a prefix is enough and the
//! result's [`length`](ParseResult::length) says how much was consumed.
//! Input that doesn't match gives [`ParseResult::FAILED`], never an error.
//!
//! Grammars are either built by hand with a [`GrammarBuilder`] (see the
//! [`grammar`] module) or compiled from EBNF text:
//!
//! ```
//! # fn main() -> combo::Result<()> {
//! let grammar = combo::compile_str(r#"
//!     sum = num , "+" , num ;
//!     num = /[0-9]+/ ;
//! "#)?;
//!
//! let sum = grammar.rule("sum").unwrap();
//! let parsed = grammar.parse(sum, "12+7");
//! assert_eq!(parsed.to_string(), r#"["12", "+", "7"]"#);
//! assert!(grammar.parse(sum, "12+7x").is_failure());
//! # Ok(())
//! # }
//! ```

mod combinator;
mod compile;
mod error;
pub mod grammar;
mod leaf;
mod result;
mod stack;

pub use combinator::Combinator;
pub use compile::{compile, compile_str};
pub use error::{Error, Result};
pub use grammar::{Grammar, GrammarBuilder, Kind, Parser, ParserId, Rule};
pub use leaf::{Literal, Pattern};
pub use result::{Mode, ParseResult, Parsed};
