// Pipeline parser for the plotting DSL

use super::ast::Script;
use super::call::parse_call;
use super::lexer::ws;
use nom::{bytes::complete::tag, combinator::eof, multi::many0, IResult};

/// Parse a complete script
/// Format: call() | call() | ...
pub fn parse_script(input: &str) -> IResult<&str, Script> {
    let (input, first) = parse_call(input)?;

    let (input, mut remaining) = many0(|input| {
        let (input, _) = ws(tag("|"))(input)?;
        parse_call(input)
    })(input)?;

    // Consume trailing whitespace and ensure end of input
    let (input, _) = ws(eof)(input)?;

    let mut calls = vec![first];
    calls.append(&mut remaining);
    Ok((input, Script { calls }))
}
