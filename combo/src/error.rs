use thiserror::Error;

use crate::grammar::ParserId;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while assembling a grammar. Input that doesn't match is
/// never an error, see [`ParseResult::FAILED`](crate::ParseResult::FAILED).
#[derive(Debug, Error)]
pub enum Error {
    #[error("literal parsers need a non-empty literal")]
    EmptyLiteral,

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("parser {0} is not a combinator and can't be defined")]
    NotACombinator(ParserId),

    #[error("combinator {0} was never defined")]
    Undefined(ParserId),

    #[error("rule belongs to a different grammar builder")]
    ForeignRule,

    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    #[error("rule '{0}' defined more than once")]
    DuplicateRule(String),

    #[error(transparent)]
    Ebnf(#[from] ebnf::Error),
}
