//! Build a [`Grammar`] from EBNF productions.
//!
//! Every production becomes one named parser, allocated before any body is
//! lowered so productions can refer to each other in any order:
//!
//! - a terminal or pattern body is the leaf itself,
//! - an alternation body is an alternative, a concatenation body a sequence,
//!   with the whole `|` (or `,`) chain flattened into one combinator,
//! - a body that is just another rule's name is a one-child alternative,
//!   which forwards the caller's mode and returns the child's result as is.
//!
//! The first production is the grammar's start rule.

use std::collections::HashMap;

use ebnf::{Production, Rhs};
use tracing::debug;

use crate::error::{Error, Result};
use crate::grammar::{Grammar, GrammarBuilder, Rule};

/// Parse EBNF source and compile it.
pub fn compile_str(source: &str) -> Result<Grammar> {
    let grammar: ebnf::Grammar = source.parse()?;
    compile(&grammar)
}

pub fn compile(source: &ebnf::Grammar) -> Result<Grammar> {
    let builder = GrammarBuilder::new();
    let mut lowering = Lowering {
        builder: &builder,
        rules: HashMap::new(),
    };

    for production in &source.rules {
        lowering.declare(production)?;
    }
    for production in &source.rules {
        lowering.define(production)?;
    }
    if let Some(first) = source.start() {
        builder.start(lowering.rules[first.lhs.name()])?;
    }

    builder.build()
}

struct Lowering<'b, 'g> {
    builder: &'b GrammarBuilder,
    rules: HashMap<&'g str, Rule<'b>>,
}

impl<'b, 'g> Lowering<'b, 'g> {
    fn declare(&mut self, production: &'g Production) -> Result<()> {
        let name = production.lhs.name();
        if self.rules.contains_key(name) {
            return Err(Error::DuplicateRule(name.to_owned()));
        }

        let rule = match production.rhs.ungrouped() {
            Rhs::Terminal(term) => self.builder.literal(&term.0)?,
            Rhs::Pattern(pat) => self.builder.pattern(&pat.0)?,
            Rhs::Concatenation(_, _) => self.builder.sequence(),
            Rhs::Alternation(_, _) | Rhs::Identifier(_) | Rhs::Group(_) => {
                self.builder.alternative()
            }
        };
        self.builder.name(name, rule)?;
        self.rules.insert(name, rule);
        Ok(())
    }

    fn define(&self, production: &Production) -> Result<()> {
        let name = production.lhs.name();
        let rule = self.rules[name];
        let body = production.rhs.ungrouped();

        let children = match body {
            Rhs::Terminal(_) | Rhs::Pattern(_) => return Ok(()),
            Rhs::Alternation(_, _) => self.lower_chain(body, true)?,
            Rhs::Concatenation(_, _) => self.lower_chain(body, false)?,
            other => vec![self.lower(other)?],
        };

        debug!(rule = name, children = children.len(), "compiled production");
        rule.define(children)?;
        Ok(())
    }

    fn lower(&self, rhs: &Rhs) -> Result<Rule<'b>> {
        match rhs {
            Rhs::Identifier(id) => self
                .rules
                .get(id.0.as_str())
                .copied()
                .ok_or_else(|| Error::UnknownRule(id.0.clone())),
            Rhs::Terminal(term) => self.builder.literal(&term.0),
            Rhs::Pattern(pat) => self.builder.pattern(&pat.0),
            Rhs::Group(inner) => self.lower(inner),
            Rhs::Alternation(_, _) => self.builder.alternative().define(self.lower_chain(rhs, true)?),
            Rhs::Concatenation(_, _) => self.builder.sequence().define(self.lower_chain(rhs, false)?),
        }
    }

    /// Lower every operand of an alternation (or concatenation) chain.
    fn lower_chain(&self, rhs: &Rhs, alternation: bool) -> Result<Vec<Rule<'b>>> {
        let mut operands = Vec::new();
        split_chain(rhs, alternation, &mut operands);
        operands.into_iter().map(|operand| self.lower(operand)).collect()
    }
}

fn split_chain<'r>(rhs: &'r Rhs, alternation: bool, out: &mut Vec<&'r Rhs>) {
    match rhs {
        Rhs::Alternation(left, right) if alternation => {
            split_chain(left, alternation, out);
            split_chain(right, alternation, out);
        }
        Rhs::Concatenation(left, right) if !alternation => {
            split_chain(left, alternation, out);
            split_chain(right, alternation, out);
        }
        other => out.push(other),
    }
}
