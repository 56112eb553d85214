//! A toy arithmetic grammar wired by hand.
//!
//! expr = sum | num ;
//! sum  = num , "+" , expr ;
//! num  = /[0-9]+/ ;

use std::thread;

use combo::{Grammar, GrammarBuilder, ParseResult, ParserId};
use pretty_assertions::assert_eq;

struct Arithmetic {
    grammar: Grammar,
    expr: ParserId,
    sum: ParserId,
    num: ParserId,
}

fn arithmetic() -> Arithmetic {
    let b = GrammarBuilder::new();
    let num = b.pattern("[0-9]+").unwrap();
    let plus = b.literal("+").unwrap();
    let expr = b.alternative();
    let sum = b.sequence().define([num, plus, expr]).unwrap();
    expr.define([sum, num]).unwrap();

    Arithmetic {
        grammar: b.build().unwrap(),
        expr: expr.id(),
        sum: sum.id(),
        num: num.id(),
    }
}

#[test]
fn recursion_terminates_and_consumes_everything() {
    let a = arithmetic();
    let res = a.grammar.parse(a.expr, "1+2+3");

    assert_eq!(res.length(), 5);
    assert_eq!(res.parser(), Some(a.sum));
    // The innermost `expr` is partial, so its sum stops after "3" rather
    // than falling through to `num`.
    assert_eq!(res.to_string(), r#"["1", "+", ["2", "+", ["3"]]]"#);

    let nums: Vec<&str> = res
        .leaves()
        .into_iter()
        .filter(|(id, _)| *id == a.num)
        .map(|(_, text)| text)
        .collect();
    assert_eq!(nums, vec!["1", "2", "3"]);
}

#[test]
fn single_number_falls_through_to_num() {
    let a = arithmetic();
    let res = a.grammar.parse(a.expr, "42");
    // sum can't consume "42" completely in total mode, so num matches.
    assert_eq!(res.parser(), Some(a.num));
    assert_eq!(res.text(), Some("42"));
}

#[test]
fn trailing_garbage_fails_total_parse() {
    let a = arithmetic();
    assert_eq!(a.grammar.parse(a.expr, "1+2x"), ParseResult::FAILED);
    assert_eq!(a.grammar.parse(a.expr, "x"), ParseResult::FAILED);
    assert_eq!(a.grammar.parse_partial(a.expr, "1+2x").length(), 3);
}

#[test]
fn long_right_recursive_input() {
    let a = arithmetic();
    let terms = 100_000;
    let input = vec!["7"; terms].join("+");
    let res = a.grammar.parse(a.expr, &input);

    assert_eq!(res.length(), input.len());
    assert_eq!(res.leaves().len(), 2 * terms - 1);

    let rendered = res.to_string();
    assert!(rendered.starts_with(r#"["7", "+", ["7", "+", "#));
    assert!(rendered.ends_with(&format!(r#"["7"]{}"#, "]".repeat(terms - 1))));
    drop(res);
}

#[test]
fn grammar_shared_across_threads() {
    let a = &arithmetic();
    let inputs = ["1+2", "30+4+5", "6", "7+", "+8"];

    let lengths: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| s.spawn(move || a.grammar.parse(a.expr, input).length()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // "7+" matches because the trailing `expr` may match nothing partially.
    assert_eq!(lengths, vec![3, 6, 1, 2, 0]);
}
