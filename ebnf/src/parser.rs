use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until},
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{all_consuming, map, opt, recognize, value},
    multi::{fold_many0, many0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::{Grammar, Identifier, Lhs, Pattern, Production, Rhs, Terminal};

/// Surround a parser with optional whitespace.
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Require that `f` consumes all of the input, ignoring trailing whitespace.
pub fn complete<'a, O, F>(f: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    all_consuming(terminated(f, multispace0))
}

/// A backslash escape inside a terminal.
fn escape(input: &str) -> IResult<&str, char> {
    preceded(
        char('\\'),
        alt((
            value('\n', char('n')),
            value('\r', char('r')),
            value('\t', char('t')),
            value('\\', char('\\')),
            value('"', char('"')),
            value('\'', char('\'')),
        )),
    )(input)
}

/// The body of a terminal up to (not including) the closing `quote`.
fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    let stop = if quote == '"' { "\"\\" } else { "'\\" };
    delimited(
        char(quote),
        fold_many0(
            alt((map(is_not(stop), str::to_owned), map(escape, String::from))),
            String::new,
            |mut acc, piece| {
                acc.push_str(&piece);
                acc
            },
        ),
        char(quote),
    )
}

pub fn terminal(input: &str) -> IResult<&str, Terminal> {
    let (rem, text) = alt((quoted('"'), quoted('\'')))(input)?;
    Ok((rem, Terminal(text)))
}

pub fn pattern(input: &str) -> IResult<&str, Pattern> {
    let (rem, matched) = delimited(tag("/"), take_until("/"), tag("/"))(input)?;
    Ok((rem, Pattern(matched.to_owned())))
}

pub fn identifier(input: &str) -> IResult<&str, Identifier> {
    let (rem, matched) = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)?;
    Ok((rem, Identifier(matched.to_owned())))
}

pub fn lhs(input: &str) -> IResult<&str, Lhs> {
    let (rem, matched) = identifier(input)?;
    Ok((rem, Lhs(matched)))
}

pub fn rhs(input: &str) -> IResult<&str, Rhs> {
    rhs_alternation(input)
}

pub fn production(input: &str) -> IResult<&str, Production> {
    let (rem, (matched_lhs, _, matched_rhs, _)) =
        tuple((ws(lhs), tag("="), rhs, tag(";")))(input)?;
    Ok((
        rem,
        Production {
            lhs: matched_lhs,
            rhs: matched_rhs,
        },
    ))
}

pub fn grammar(input: &str) -> IResult<&str, Grammar> {
    let (rem, rules) = many0(production)(input)?;
    Ok((rem, Grammar { rules }))
}

fn rhs_alternation(input: &str) -> IResult<&str, Rhs> {
    let (rem, (first, rest)) = pair(
        rhs_concatenation,
        opt(preceded(tag("|"), rhs_alternation)),
    )(input)?;
    let matched = match rest {
        Some(rest) => Rhs::Alternation(Box::new(first), Box::new(rest)),
        None => first,
    };
    Ok((rem, matched))
}

fn rhs_concatenation(input: &str) -> IResult<&str, Rhs> {
    let (rem, (first, rest)) =
        pair(rhs_factor, opt(preceded(tag(","), rhs_concatenation)))(input)?;
    let matched = match rest {
        Some(rest) => Rhs::Concatenation(Box::new(first), Box::new(rest)),
        None => first,
    };
    Ok((rem, matched))
}

fn rhs_factor(input: &str) -> IResult<&str, Rhs> {
    ws(alt((
        map(terminal, Rhs::Terminal),
        map(pattern, Rhs::Pattern),
        map(identifier, Rhs::Identifier),
        rhs_group,
    )))(input)
}

fn rhs_group(input: &str) -> IResult<&str, Rhs> {
    let (rem, matched) = delimited(tag("("), rhs_alternation, tag(")"))(input)?;
    Ok((rem, Rhs::Group(Box::new(matched))))
}
