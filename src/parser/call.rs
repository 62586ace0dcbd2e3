// Call parser: name(arg, name: value, ...)

use super::ast::{Arg, ArgValue, Call};
use super::lexer::{identifier, number_literal, string_literal, ws};
use nom::{
    branch::alt,
    character::complete::char,
    combinator::map,
    multi::separated_list0,
    sequence::{delimited, separated_pair},
    IResult,
};

/// Parse an argument value. Identifiers are tried before numbers so that
/// columns such as `inflation` are not read as `inf`.
pub fn parse_value(input: &str) -> IResult<&str, ArgValue> {
    alt((
        map(string_literal, ArgValue::Str),
        parse_list,
        map(identifier, |ident| match ident.as_str() {
            "true" => ArgValue::Bool(true),
            "false" => ArgValue::Bool(false),
            _ => ArgValue::Column(ident),
        }),
        map(number_literal, ArgValue::Number),
    ))(input)
}

fn parse_list(input: &str) -> IResult<&str, ArgValue> {
    map(
        delimited(
            ws(char('[')),
            separated_list0(ws(char(',')), ws(parse_value)),
            ws(char(']')),
        ),
        ArgValue::List,
    )(input)
}

fn parse_arg(input: &str) -> IResult<&str, Arg> {
    alt((
        map(
            separated_pair(ws(identifier), char(':'), ws(parse_value)),
            |(name, value)| Arg {
                name: Some(name),
                value,
            },
        ),
        map(ws(parse_value), |value| Arg { name: None, value }),
    ))(input)
}

/// Parse one call
pub fn parse_call(input: &str) -> IResult<&str, Call> {
    let (input, name) = ws(identifier)(input)?;
    let (input, args) = delimited(
        char('('),
        separated_list0(ws(char(',')), parse_arg),
        ws(char(')')),
    )(input)?;
    Ok((input, Call { name, args }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_empty() {
        let (rest, call) = parse_call("legend()").unwrap();
        assert_eq!(rest, "");
        assert_eq!(call.name, "legend");
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_parse_call_named_args() {
        let (_, call) = parse_call(r#"plot(x: date, y: temp, style: "r-o")"#).unwrap();
        assert_eq!(call.name, "plot");
        assert_eq!(call.named("x"), Some(&ArgValue::Column("date".to_string())));
        assert_eq!(call.named("style"), Some(&ArgValue::Str("r-o".to_string())));
    }

    #[test]
    fn test_parse_call_positional_args() {
        let (_, call) = parse_call("xlim(0, 10.5)").unwrap();
        let values: Vec<&ArgValue> = call.positional().collect();
        assert_eq!(values, vec![&ArgValue::Number(0.0), &ArgValue::Number(10.5)]);
    }

    #[test]
    fn test_parse_call_mixed_args() {
        let (_, call) = parse_call(r#"figure("a", title: "Sales")"#).unwrap();
        assert_eq!(call.arg("key", 0), Some(&ArgValue::Str("a".to_string())));
        assert_eq!(call.named("title"), Some(&ArgValue::Str("Sales".to_string())));
    }

    #[test]
    fn test_parse_value_kinds() {
        assert_eq!(parse_value("true"), Ok(("", ArgValue::Bool(true))));
        assert_eq!(parse_value("inflation"), Ok(("", ArgValue::Column("inflation".to_string()))));
        assert_eq!(parse_value("-2"), Ok(("", ArgValue::Number(-2.0))));
        assert_eq!(
            parse_value(r#"["red", "blue"]"#),
            Ok((
                "",
                ArgValue::List(vec![ArgValue::Str("red".to_string()), ArgValue::Str("blue".to_string())])
            ))
        );
    }

    #[test]
    fn test_parse_call_unclosed() {
        assert!(parse_call("plot(x: a").is_err());
    }

    #[test]
    fn test_parse_call_missing_value() {
        assert!(parse_call("plot(x: )").is_err());
    }
}
