use std::fmt::{self, Display};
use std::mem;

use crate::grammar::ParserId;
use crate::stack::ensure_sufficient_stack;

/// Whether a parser must consume all of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// The whole input must be consumed.
    #[default]
    Total,
    /// A prefix of the input may be consumed. The caller advances past the
    /// result's length.
    Partial,
}

/// What a successful parse consumed.
///
/// Trees are as deep as the recursion that built them, so dropping,
/// cloning and comparing never recurse on the plain thread stack.
#[derive(Debug)]
pub enum Parsed<'t> {
    /// Text consumed by a leaf parser.
    Text(&'t str),
    /// Results of a combinator's children, in order.
    Children(Vec<ParseResult<'t>>),
}

impl<'t> Parsed<'t> {
    pub fn length(&self) -> usize {
        match self {
            Parsed::Text(text) => text.len(),
            Parsed::Children(children) => children.iter().map(ParseResult::length).sum(),
        }
    }
}

impl Clone for Parsed<'_> {
    fn clone(&self) -> Self {
        match self {
            Parsed::Text(text) => Parsed::Text(*text),
            Parsed::Children(children) => {
                ensure_sufficient_stack(|| Parsed::Children(children.clone()))
            }
        }
    }
}

impl PartialEq for Parsed<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Parsed::Text(a), Parsed::Text(b)) => a == b,
            (Parsed::Children(a), Parsed::Children(b)) => ensure_sufficient_stack(|| a == b),
            _ => false,
        }
    }
}

impl Eq for Parsed<'_> {}

impl Drop for Parsed<'_> {
    fn drop(&mut self) {
        let mut pending = match self {
            Parsed::Children(children) => mem::take(children),
            Parsed::Text(_) => return,
        };
        // Children are emptied before they drop, so nothing below recurses.
        while let Some(mut child) = pending.pop() {
            if let ParseResult::Matched {
                parsed: Parsed::Children(children),
                ..
            } = &mut child
            {
                pending.append(children);
            }
        }
    }
}

/// The outcome of a parse attempt.
///
/// Every failing parse returns [`ParseResult::FAILED`], so failure checks are
/// a plain comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult<'t> {
    Failed,
    Matched {
        /// The parser that produced this result.
        parser: ParserId,
        /// Bytes consumed, summed once when the result is built.
        length: usize,
        parsed: Parsed<'t>,
    },
}

impl<'t> ParseResult<'t> {
    pub const FAILED: Self = ParseResult::Failed;

    pub(crate) fn leaf(parser: ParserId, text: &'t str) -> Self {
        ParseResult::Matched {
            parser,
            length: text.len(),
            parsed: Parsed::Text(text),
        }
    }

    pub(crate) fn node(parser: ParserId, children: Vec<ParseResult<'t>>) -> Self {
        let parsed = Parsed::Children(children);
        ParseResult::Matched {
            parser,
            length: parsed.length(),
            parsed,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ParseResult::Failed)
    }

    /// Number of bytes consumed. Zero for a failure.
    pub fn length(&self) -> usize {
        match self {
            ParseResult::Failed => 0,
            ParseResult::Matched { length, .. } => *length,
        }
    }

    pub fn parser(&self) -> Option<ParserId> {
        match self {
            ParseResult::Failed => None,
            ParseResult::Matched { parser, .. } => Some(*parser),
        }
    }

    pub fn parsed(&self) -> Option<&Parsed<'t>> {
        match self {
            ParseResult::Failed => None,
            ParseResult::Matched { parsed, .. } => Some(parsed),
        }
    }

    /// The consumed text of a leaf result.
    pub fn text(&self) -> Option<&'t str> {
        match self.parsed() {
            Some(Parsed::Text(text)) => Some(*text),
            _ => None,
        }
    }

    /// Child results of a combinator result. Empty for leaves and failures.
    pub fn children(&self) -> &[ParseResult<'t>] {
        match self.parsed() {
            Some(Parsed::Children(children)) => children.as_slice(),
            _ => &[],
        }
    }

    /// Leaf results in input order, paired with the parser that matched them.
    pub fn leaves(&self) -> Vec<(ParserId, &'t str)> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(result) = pending.pop() {
            match result {
                ParseResult::Failed => {}
                ParseResult::Matched {
                    parser,
                    parsed: Parsed::Text(text),
                    ..
                } => out.push((*parser, *text)),
                ParseResult::Matched {
                    parsed: Parsed::Children(children),
                    ..
                } => pending.extend(children.iter().rev()),
            }
        }
        out
    }
}

impl Display for ParseResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseResult::Failed => write!(f, "FAILED"),
            ParseResult::Matched { parsed, .. } => write!(f, "{}", parsed),
        }
    }
}

impl Display for Parsed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Parsed::Text(text) => write!(f, "{:?}", text),
            Parsed::Children(children) => {
                write!(f, "[")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    ensure_sufficient_stack(|| write!(f, "{}", child))?;
                }
                write!(f, "]")
            }
        }
    }
}
