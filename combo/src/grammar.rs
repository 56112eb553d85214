//! Grammar graphs.
//!
//! Grammars are assembled with a [`GrammarBuilder`] in two phases: parsers
//! are created first, combinators get their children afterwards with
//! [`Rule::define`]. Since a combinator can be referenced before it is
//! defined, rules may refer to each other (or themselves) in any order.
//!
//! ```
//! use combo::GrammarBuilder;
//!
//! # fn main() -> combo::Result<()> {
//! let b = GrammarBuilder::new();
//! let digits = b.pattern("[0-9]+")?;
//! let plus = b.literal("+")?;
//! let expr = b.alternative();
//! let sum = b.sequence().define([digits, plus, expr])?;
//! expr.define([sum, digits])?;
//!
//! let grammar = b.build()?;
//! assert_eq!(grammar.parse(expr, "1+2+3").length(), 5);
//! assert!(grammar.parse(expr, "1+x").is_failure());
//! # Ok(())
//! # }
//! ```
//!
//! Recursion is resolved while parsing, one call per rule application. A
//! grammar that can recurse without consuming input first (left recursion)
//! never terminates; it is up to the grammar to avoid it.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::ops::BitOr;
use std::ptr;

use tracing::{debug, trace};

use crate::combinator::Combinator;
use crate::error::{Error, Result};
use crate::leaf::{Literal, Pattern};
use crate::result::{Mode, ParseResult};
use crate::stack::ensure_sufficient_stack;

/// Index of a parser within its grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParserId(usize);

impl ParserId {
    pub(crate) fn new(idx: usize) -> Self {
        ParserId(idx)
    }
}

impl Display for ParserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Literal,
    Pattern,
    Sequence,
    Alternative,
}

impl Kind {
    pub fn is_combinator(&self) -> bool {
        matches!(self, Kind::Sequence | Kind::Alternative)
    }
}

/// A node in the grammar graph.
#[derive(Debug, Clone)]
pub enum Parser {
    Literal(Literal),
    Pattern(Pattern),
    Sequence(Combinator),
    Alternative(Combinator),
}

impl Parser {
    pub fn kind(&self) -> Kind {
        match self {
            Parser::Literal(_) => Kind::Literal,
            Parser::Pattern(_) => Kind::Pattern,
            Parser::Sequence(_) => Kind::Sequence,
            Parser::Alternative(_) => Kind::Alternative,
        }
    }

    /// Children of a combinator. Leaves have none.
    pub fn children(&self) -> &[ParserId] {
        match self {
            Parser::Sequence(c) | Parser::Alternative(c) => c.children(),
            Parser::Literal(_) | Parser::Pattern(_) => &[],
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    parser: Parser,
    /// Leaves are defined on creation, combinators once `define` is called.
    defined: bool,
    name: Option<String>,
}

/// Assembles a [`Grammar`].
///
/// Builders hand out [`Rule`] handles that borrow the builder, so a builder
/// is used from one thread. The finished grammar can be shared freely.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    slots: RefCell<Vec<Slot>>,
    start: Cell<Option<ParserId>>,
    /// Set when `either` was handed a rule from another builder.
    foreign: Cell<bool>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, parser: Parser, defined: bool) -> Rule<'_> {
        let mut slots = self.slots.borrow_mut();
        let id = ParserId(slots.len());
        slots.push(Slot {
            parser,
            defined,
            name: None,
        });
        Rule { builder: self, id }
    }

    fn owns(&self, rule: &Rule<'_>) -> bool {
        ptr::eq(self, rule.builder)
    }

    pub fn literal(&self, literal: &str) -> Result<Rule<'_>> {
        Ok(self.push(Parser::Literal(Literal::new(literal)?), true))
    }

    pub fn pattern(&self, pattern: &str) -> Result<Rule<'_>> {
        Ok(self.push(Parser::Pattern(Pattern::new(pattern)?), true))
    }

    /// An empty sequence, to be defined later.
    pub fn sequence(&self) -> Rule<'_> {
        self.push(Parser::Sequence(Combinator::default()), false)
    }

    /// An empty alternative, to be defined later.
    pub fn alternative(&self) -> Rule<'_> {
        self.push(Parser::Alternative(Combinator::default()), false)
    }

    /// A new alternative trying `left` then `right`. Operands that are
    /// already defined alternatives contribute their children instead of
    /// being nested.
    pub fn either<'b>(&'b self, left: Rule<'b>, right: Rule<'b>) -> Rule<'b> {
        let mut children = Vec::new();
        {
            let slots = self.slots.borrow();
            for rule in [left, right] {
                if !self.owns(&rule) {
                    self.foreign.set(true);
                    children.push(rule.id);
                    continue;
                }
                let slot = &slots[rule.id.0];
                match &slot.parser {
                    Parser::Alternative(c) if slot.defined => {
                        children.extend_from_slice(c.children())
                    }
                    _ => children.push(rule.id),
                }
            }
        }
        self.push(Parser::Alternative(Combinator::new(children)), true)
    }

    /// Set the children of a combinator, replacing any previous definition.
    ///
    /// A single child that is a defined combinator of the same kind is
    /// unwrapped, the target adopts its children directly.
    pub fn define<'b>(&'b self, target: Rule<'b>, children: Vec<Rule<'b>>) -> Result<Rule<'b>> {
        if !self.owns(&target) || children.iter().any(|child| !self.owns(child)) {
            return Err(Error::ForeignRule);
        }

        let mut slots = self.slots.borrow_mut();
        let kind = slots[target.id.0].parser.kind();
        if !kind.is_combinator() {
            return Err(Error::NotACombinator(target.id));
        }

        let mut ids: Vec<ParserId> = children.iter().map(|child| child.id).collect();
        if ids.len() == 1 {
            let slot = &slots[ids[0].0];
            if slot.defined && slot.parser.kind() == kind {
                ids = slot.parser.children().to_vec();
            }
        }

        let slot = &mut slots[target.id.0];
        if let Parser::Sequence(c) | Parser::Alternative(c) = &mut slot.parser {
            c.set_children(ids);
        }
        slot.defined = true;

        Ok(target)
    }

    /// Attach a name to a rule, for lookup with [`Grammar::rule`].
    pub fn name(&self, name: &str, rule: Rule<'_>) -> Result<()> {
        if !self.owns(&rule) {
            return Err(Error::ForeignRule);
        }
        let mut slots = self.slots.borrow_mut();
        if slots.iter().any(|slot| slot.name.as_deref() == Some(name)) {
            return Err(Error::DuplicateRule(name.to_owned()));
        }
        slots[rule.id.0].name = Some(name.to_owned());
        Ok(())
    }

    /// Mark the rule callers should parse with by default.
    pub fn start(&self, rule: Rule<'_>) -> Result<()> {
        if !self.owns(&rule) {
            return Err(Error::ForeignRule);
        }
        self.start.set(Some(rule.id));
        Ok(())
    }

    /// Snapshot the builder into an immutable grammar.
    ///
    /// Fails if any combinator was never defined. The builder stays usable,
    /// later changes don't affect grammars already built.
    pub fn build(&self) -> Result<Grammar> {
        if self.foreign.get() {
            return Err(Error::ForeignRule);
        }

        let slots = self.slots.borrow();
        if let Some(idx) = slots.iter().position(|slot| !slot.defined) {
            return Err(Error::Undefined(ParserId(idx)));
        }

        let mut parsers = Vec::with_capacity(slots.len());
        let mut names = Vec::with_capacity(slots.len());
        let mut index = HashMap::new();
        for (idx, slot) in slots.iter().enumerate() {
            parsers.push(slot.parser.clone());
            names.push(slot.name.clone());
            if let Some(name) = &slot.name {
                index.insert(name.clone(), ParserId(idx));
            }
        }

        debug!(parsers = parsers.len(), named = index.len(), "built grammar");

        Ok(Grammar {
            parsers,
            names,
            index,
            start: self.start.get(),
        })
    }
}

/// A handle to a parser inside a [`GrammarBuilder`].
///
/// `a | b` builds an alternative, see [`GrammarBuilder::either`].
#[derive(Clone, Copy)]
pub struct Rule<'b> {
    builder: &'b GrammarBuilder,
    id: ParserId,
}

impl<'b> Rule<'b> {
    pub fn id(&self) -> ParserId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.builder.slots.borrow()[self.id.0].parser.kind()
    }

    /// Define this combinator's children and return it.
    pub fn define<I>(self, children: I) -> Result<Rule<'b>>
    where
        I: IntoIterator<Item = Rule<'b>>,
    {
        self.builder.define(self, children.into_iter().collect())
    }
}

impl fmt::Debug for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.id).finish()
    }
}

impl PartialEq for Rule<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.builder, other.builder) && self.id == other.id
    }
}

impl Eq for Rule<'_> {}

impl<'b> BitOr for Rule<'b> {
    type Output = Rule<'b>;

    fn bitor(self, rhs: Rule<'b>) -> Rule<'b> {
        self.builder.either(self, rhs)
    }
}

impl From<Rule<'_>> for ParserId {
    fn from(rule: Rule<'_>) -> Self {
        rule.id
    }
}

/// An immutable grammar graph.
///
/// Parsing never mutates the grammar, so one grammar can serve any number
/// of parses from any number of threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    parsers: Vec<Parser>,
    names: Vec<Option<String>>,
    index: HashMap<String, ParserId>,
    start: Option<ParserId>,
}

impl Grammar {
    /// Parse the entirety of `text`.
    ///
    /// # Panics
    ///
    /// Panics if `id` doesn't belong to this grammar.
    pub fn parse<'t>(&self, id: impl Into<ParserId>, text: &'t str) -> ParseResult<'t> {
        self.parse_with(id, text, Mode::Total)
    }

    /// Parse a prefix of `text`. The result's length is how much was
    /// consumed.
    pub fn parse_partial<'t>(&self, id: impl Into<ParserId>, text: &'t str) -> ParseResult<'t> {
        self.parse_with(id, text, Mode::Partial)
    }

    pub fn parse_with<'t>(
        &self,
        id: impl Into<ParserId>,
        text: &'t str,
        mode: Mode,
    ) -> ParseResult<'t> {
        let id = id.into();
        trace!(parser = %id, ?mode, len = text.len(), "parse");
        self.run(id, text, mode)
    }

    pub(crate) fn run<'t>(&self, id: ParserId, text: &'t str, mode: Mode) -> ParseResult<'t> {
        match &self.parsers[id.0] {
            Parser::Literal(lit) => lit.parse(id, text, mode),
            Parser::Pattern(pat) => pat.parse(id, text, mode),
            Parser::Sequence(seq) => {
                ensure_sufficient_stack(|| seq.parse_sequence(self, id, text, mode))
            }
            Parser::Alternative(alt) => {
                ensure_sufficient_stack(|| alt.parse_alternative(self, text, mode))
            }
        }
    }

    pub fn get(&self, id: ParserId) -> Option<&Parser> {
        self.parsers.get(id.0)
    }

    /// Look up a named rule.
    pub fn rule(&self, name: &str) -> Option<ParserId> {
        self.index.get(name).copied()
    }

    pub fn name_of(&self, id: ParserId) -> Option<&str> {
        self.names.get(id.0)?.as_deref()
    }

    pub fn start(&self) -> Option<ParserId> {
        self.start
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
    }

    #[test]
    fn alternation_flattens_left_operand() {
        let b = GrammarBuilder::new();
        let p1 = b.literal("a").unwrap();
        let p2 = b.literal("b").unwrap();
        let p3 = b.literal("c").unwrap();
        let alt = (p1 | p2) | p3;

        let g = b.build().unwrap();
        let parser = g.get(alt.id()).unwrap();
        assert_eq!(parser.kind(), Kind::Alternative);
        assert_eq!(parser.children(), &[p1.id(), p2.id(), p3.id()]);
    }

    #[test]
    fn alternation_flattens_right_operand() {
        let b = GrammarBuilder::new();
        let p1 = b.literal("a").unwrap();
        let p2 = b.literal("b").unwrap();
        let p3 = b.literal("c").unwrap();
        let alt = p1 | (p2 | p3);

        let g = b.build().unwrap();
        assert_eq!(g.get(alt.id()).unwrap().children(), &[p1.id(), p2.id(), p3.id()]);
    }

    #[test]
    fn alternation_of_two_alternatives() {
        let b = GrammarBuilder::new();
        let [p1, p2, p3, p4] = ["a", "b", "c", "d"].map(|s| b.literal(s).unwrap());
        let alt = (p1 | p2) | (p3 | p4);

        let g = b.build().unwrap();
        assert_eq!(
            g.get(alt.id()).unwrap().children(),
            &[p1.id(), p2.id(), p3.id(), p4.id()]
        );
    }

    #[test]
    fn alternation_keeps_sequences_nested() {
        let b = GrammarBuilder::new();
        let a = b.literal("a").unwrap();
        let seq = b.sequence().define([a, a]).unwrap();
        let alt = seq | a;

        let g = b.build().unwrap();
        assert_eq!(g.get(alt.id()).unwrap().children(), &[seq.id(), a.id()]);
    }

    #[test]
    fn alternation_keeps_undefined_alternative_as_reference() {
        let b = GrammarBuilder::new();
        let a = b.literal("a").unwrap();
        let later = b.alternative();
        let alt = a | later;
        later.define([a]).unwrap();

        let g = b.build().unwrap();
        assert_eq!(g.get(alt.id()).unwrap().children(), &[a.id(), later.id()]);
    }

    #[test]
    fn define_unwraps_single_same_kind_child() {
        let b = GrammarBuilder::new();
        let x = b.literal("x").unwrap();
        let y = b.literal("y").unwrap();
        let inner = b.sequence().define([x, y]).unwrap();
        let outer = b.sequence().define([inner]).unwrap();

        let g = b.build().unwrap();
        assert_eq!(g.get(outer.id()).unwrap().children(), &[x.id(), y.id()]);
    }

    #[test]
    fn define_keeps_single_child_of_other_kind() {
        let b = GrammarBuilder::new();
        let x = b.literal("x").unwrap();
        let y = b.literal("y").unwrap();
        let inner = b.alternative().define([x, y]).unwrap();
        let outer = b.sequence().define([inner]).unwrap();

        let g = b.build().unwrap();
        assert_eq!(g.get(outer.id()).unwrap().children(), &[inner.id()]);
    }

    #[test]
    fn define_keeps_single_undefined_child() {
        let b = GrammarBuilder::new();
        let inner = b.sequence();
        let outer = b.sequence().define([inner]).unwrap();
        inner.define(Vec::new()).unwrap();

        let g = b.build().unwrap();
        assert_eq!(g.get(outer.id()).unwrap().children(), &[inner.id()]);
    }

    #[test]
    fn redefine_replaces_children() {
        let b = GrammarBuilder::new();
        let x = b.literal("x").unwrap();
        let y = b.literal("y").unwrap();
        let seq = b.sequence().define([x]).unwrap();
        seq.define([y, x]).unwrap();

        let g = b.build().unwrap();
        assert_eq!(g.get(seq.id()).unwrap().children(), &[y.id(), x.id()]);
    }

    #[test]
    fn define_leaf_is_an_error() {
        let b = GrammarBuilder::new();
        let x = b.literal("x").unwrap();
        let err = x.define([x]).unwrap_err();
        assert!(matches!(err, Error::NotACombinator(id) if id == x.id()));
    }

    #[test]
    fn build_rejects_undefined_combinator() {
        let b = GrammarBuilder::new();
        let x = b.literal("x").unwrap();
        let never = b.alternative();
        b.sequence().define([x, never]).unwrap();

        let err = b.build().unwrap_err();
        assert!(matches!(err, Error::Undefined(id) if id == never.id()));
    }

    #[test]
    fn foreign_rules_are_rejected() {
        let b1 = GrammarBuilder::new();
        let b2 = GrammarBuilder::new();
        let x = b1.literal("x").unwrap();
        let y = b2.literal("y").unwrap();

        let seq = b1.sequence();
        assert!(matches!(seq.define([x, y]), Err(Error::ForeignRule)));
        assert!(matches!(b1.name("y", y), Err(Error::ForeignRule)));

        seq.define([x]).unwrap();
        let _ = x | y;
        assert!(matches!(b1.build(), Err(Error::ForeignRule)));
    }

    #[test]
    fn names_and_start() {
        let b = GrammarBuilder::new();
        let num = b.pattern("[0-9]+").unwrap();
        let plus = b.literal("+").unwrap();
        b.name("num", num).unwrap();
        b.start(num).unwrap();
        assert!(matches!(b.name("num", plus), Err(Error::DuplicateRule(ref n)) if n == "num"));

        let g = b.build().unwrap();
        assert_eq!(g.rule("num"), Some(num.id()));
        assert_eq!(g.rule("plus"), None);
        assert_eq!(g.name_of(num.id()), Some("num"));
        assert_eq!(g.name_of(plus.id()), None);
        assert_eq!(g.start(), Some(num.id()));
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn built_grammar_is_a_snapshot() {
        let b = GrammarBuilder::new();
        let x = b.literal("x").unwrap();
        let y = b.literal("y").unwrap();
        let alt = b.alternative().define([x]).unwrap();

        let before = b.build().unwrap();
        alt.define([y]).unwrap();
        let after = b.build().unwrap();

        assert!(!before.parse(alt, "x").is_failure());
        assert!(before.parse(alt, "y").is_failure());
        assert!(after.parse(alt, "x").is_failure());
        assert!(!after.parse(alt, "y").is_failure());
    }

    #[test]
    fn rules_compare_by_builder_and_id() {
        let b = GrammarBuilder::new();
        let x = b.literal("x").unwrap();
        let y = b.literal("x").unwrap();
        assert_eq!(x, x);
        assert_ne!(x, y);
        assert_eq!(x.kind(), Kind::Literal);
        assert_eq!(format!("{:?}", x), "Rule(ParserId(0))");
    }
}
