use crate::grammar::{Grammar, ParserId};
use crate::result::{Mode, ParseResult};

/// The ordered children of a sequence or alternative.
///
/// Children are ids into the owning [`Grammar`], so a combinator may list
/// itself (directly or through other combinators) to express recursion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combinator {
    children: Vec<ParserId>,
}

impl Combinator {
    pub(crate) fn new(children: Vec<ParserId>) -> Self {
        Combinator { children }
    }

    pub fn children(&self) -> &[ParserId] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<ParserId>) {
        self.children = children;
    }

    /// Children are always parsed partially, each starting where the last
    /// one stopped.
    ///
    /// A partial parse stops at the first failing child and succeeds with
    /// whatever matched before it. A total parse fails instead, and also
    /// fails if the children leave any input unconsumed.
    pub(crate) fn parse_sequence<'t>(
        &self,
        grammar: &Grammar,
        id: ParserId,
        text: &'t str,
        mode: Mode,
    ) -> ParseResult<'t> {
        let mut rest = text;
        let mut results = Vec::with_capacity(self.children.len());

        for &child in &self.children {
            let result = grammar.run(child, rest, Mode::Partial);
            if result.is_failure() {
                if mode == Mode::Total {
                    return ParseResult::FAILED;
                }
                break;
            }
            rest = &rest[result.length()..];
            results.push(result);
        }

        if mode == Mode::Total && !rest.is_empty() {
            return ParseResult::FAILED;
        }

        ParseResult::node(id, results)
    }

    /// First child to succeed wins, its result is returned as is.
    pub(crate) fn parse_alternative<'t>(
        &self,
        grammar: &Grammar,
        text: &'t str,
        mode: Mode,
    ) -> ParseResult<'t> {
        for &child in &self.children {
            let result = grammar.run(child, text, mode);
            if !result.is_failure() {
                return result;
            }
        }
        ParseResult::FAILED
    }
}
