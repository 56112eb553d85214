//! A small EBNF dialect for describing grammars as text.
//!
//! ```text
//! expr = sum | num ;
//! sum = num , "+" , expr ;
//! num = /[0-9]+/ ;
//! ```
//!
//! Productions are `name = body ;`. Bodies are built from identifiers,
//! quoted terminals, slash-delimited patterns, parenthesized groups,
//! concatenation (`,`) and alternation (`|`). Concatenation binds tighter
//! than alternation.

use std::fmt::{self, Display};
use std::str::FromStr;

mod error;
pub use error::Error;
mod parser;

/// A constant identifying production rules.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Identifier(pub String);

impl Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A literal string.
///
/// Quoted with `"` or `'`. Inside the quotes `\n`, `\r`, `\t`, `\\`, `\"`
/// and `\'` are escapes.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Terminal(pub String);

impl Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let quote = if self.0.contains('"') && !self.0.contains('\'') {
            '\''
        } else {
            '"'
        };
        write!(f, "{}", quote)?;
        for c in self.0.chars() {
            match c {
                '\n' => write!(f, "\\n")?,
                '\r' => write!(f, "\\r")?,
                '\t' => write!(f, "\\t")?,
                '\\' => write!(f, "\\\\")?,
                c if c == quote => write!(f, "\\{}", c)?,
                c => write!(f, "{}", c)?,
            }
        }
        write!(f, "{}", quote)
    }
}

impl From<&str> for Terminal {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A regular expression matched against the start of the remaining input.
/// Written between slashes, and may not itself contain a slash.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Pattern(pub String);

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/{}/", self.0)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The lhs of a production rule.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Lhs(pub Identifier);

impl Lhs {
    pub fn name(&self) -> &str {
        &self.0 .0
    }
}

impl From<&str> for Lhs {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl Display for Lhs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The rhs of a production rule.
///
/// Chains are right-nested: `a | b | c` is `Alternation(a, Alternation(b, c))`.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Rhs {
    Identifier(Identifier),
    Terminal(Terminal),
    Pattern(Pattern),
    Group(Box<Rhs>),
    Alternation(Box<Rhs>, Box<Rhs>),
    Concatenation(Box<Rhs>, Box<Rhs>),
}

impl Rhs {
    /// Strip any groups wrapping this rhs.
    pub fn ungrouped(&self) -> &Rhs {
        match self {
            Rhs::Group(inner) => inner.ungrouped(),
            other => other,
        }
    }
}

impl Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rhs::Identifier(iden) => write!(f, "{}", iden),
            Rhs::Terminal(term) => write!(f, "{}", term),
            Rhs::Pattern(pat) => write!(f, "{}", pat),
            Rhs::Group(rhs) => write!(f, "( {} )", rhs),
            Rhs::Alternation(rhs1, rhs2) => write!(f, "{} | {}", rhs1, rhs2),
            Rhs::Concatenation(rhs1, rhs2) => write!(f, "{} , {}", rhs1, rhs2),
        }
    }
}

impl FromStr for Rhs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, rhs) = parser::complete(parser::rhs)(s)?;
        Ok(rhs)
    }
}

/// A production rule.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Production {
    pub lhs: Lhs,
    pub rhs: Rhs,
}

impl Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {} ;", self.lhs, self.rhs)
    }
}

impl FromStr for Production {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, rule) = parser::complete(parser::production)(s)?;
        Ok(rule)
    }
}

/// A set of rules. The first rule is the start rule.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Grammar {
    pub rules: Vec<Production>,
}

impl Grammar {
    pub fn start(&self) -> Option<&Production> {
        self.rules.first()
    }

    pub fn production(&self, name: &str) -> Option<&Production> {
        self.rules.iter().find(|rule| rule.lhs.name() == name)
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, grammar) = parser::complete(parser::grammar)(s)?;
        Ok(grammar)
    }
}
