use regex::Regex;

use crate::error::{Error, Result};
use crate::grammar::ParserId;
use crate::result::{Mode, ParseResult};

/// Matches an exact, non-empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    literal: String,
}

impl Literal {
    pub fn new(literal: impl Into<String>) -> Result<Self> {
        let literal = literal.into();
        if literal.is_empty() {
            return Err(Error::EmptyLiteral);
        }
        Ok(Literal { literal })
    }

    pub fn as_str(&self) -> &str {
        &self.literal
    }

    pub(crate) fn parse<'t>(&self, id: ParserId, text: &'t str, mode: Mode) -> ParseResult<'t> {
        if !text.starts_with(self.literal.as_str()) {
            return ParseResult::FAILED;
        }
        if mode == Mode::Total && text.len() != self.literal.len() {
            return ParseResult::FAILED;
        }
        ParseResult::leaf(id, &text[..self.literal.len()])
    }
}

/// Matches a regular expression anchored at the start of the input.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |source| Error::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        };
        // Compiled on its own first so an unbalanced `)` can't close the
        // anchoring group early.
        Regex::new(pattern).map_err(invalid)?;
        let regex = Regex::new(&format!(r"\A(?:{})", pattern)).map_err(invalid)?;
        Ok(Pattern {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// The pattern as written, without the anchoring.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Only the leftmost-first match is considered. In total mode it has to
    /// reach the end of `text`, a shorter alternative that happens to also
    /// match everything is not searched for.
    pub(crate) fn parse<'t>(&self, id: ParserId, text: &'t str, mode: Mode) -> ParseResult<'t> {
        let end = match self.regex.find(text) {
            Some(m) if m.start() == 0 => m.end(),
            _ => return ParseResult::FAILED,
        };
        if mode == Mode::Total && end != text.len() {
            return ParseResult::FAILED;
        }
        ParseResult::leaf(id, &text[..end])
    }
}
