// Lexical helpers shared by the pipeline parsers

use crate::key::number_value;
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{map, map_opt, map_res, opt, recognize, value},
    multi::many0_count,
    number::complete::recognize_float,
    sequence::{delimited, pair, terminated},
    IResult,
};
use serde_json::Value;

/// Wrap a parser so it skips surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// `name:` argument key
pub fn key<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(ws(tag(name)), ws(char(':')))
}

/// Letters, digits, `_` and `.`, not starting with a digit
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_"), tag(".")))),
        )),
        String::from,
    )(input)
}

/// Double-quoted string with `\"`, `\\`, `\n` and `\t` escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                    value("\t", tag("t")),
                )),
            )),
            |s: Option<String>| s.unwrap_or_default(),
        ),
        char('"'),
    )(input)
}

pub fn number_literal(input: &str) -> IResult<&str, f64> {
    map_res(recognize_float, str::parse::<f64>)(input)
}

/// `true`, `false` or `null` as a whole word
fn keyword_literal(input: &str) -> IResult<&str, Value> {
    map_opt(identifier, |word| match word.as_str() {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        "null" => Some(Value::Null),
        _ => None,
    })(input)
}

/// Constant value: string, number, boolean or null
pub fn literal(input: &str) -> IResult<&str, Value> {
    alt((
        map(string_literal, Value::String),
        map(number_literal, number_value),
        keyword_literal,
    ))(input)
}

/// Bare or quoted field name
pub fn field_name(input: &str) -> IResult<&str, String> {
    alt((string_literal, identifier))(input)
}
