// Accessor expressions: field(a), values(1), join("-", a, b), combine(sum, a, b), range(lo, hi)

use super::lexer::{field_name, identifier, literal, string_literal, ws};
use crate::accessor::{FieldAccessor, Reducer};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, map_opt},
    multi::separated_list1,
    sequence::{delimited, preceded, separated_pair},
    IResult,
};

/// `name( ... )` call with the given argument parser
fn call<'a, O, F>(name: &'static str, args: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(ws(tag(name)), delimited(ws(char('(')), args, ws(char(')'))))
}

fn field_list(input: &str) -> IResult<&str, Vec<String>> {
    separated_list1(ws(char(',')), ws(field_name))(input)
}

fn reducer(input: &str) -> IResult<&str, Reducer> {
    map_opt(identifier, |name| Reducer::parse(&name))(input)
}

/// Parse an accessor expression.
///
/// A bare name reads that field; a bare literal is a constant.
pub fn parse_accessor(input: &str) -> IResult<&str, FieldAccessor> {
    alt((
        map(call("field", ws(field_name)), FieldAccessor::Field),
        map(call("values", ws(literal)), FieldAccessor::Constant),
        map(
            call(
                "join",
                separated_pair(ws(string_literal), ws(char(',')), field_list),
            ),
            |(separator, names)| FieldAccessor::Join { separator, names },
        ),
        map(
            call("combine", separated_pair(ws(reducer), ws(char(',')), field_list)),
            |(reducer, names)| FieldAccessor::Combine { reducer, names },
        ),
        map(
            call(
                "range",
                separated_pair(ws(field_name), ws(char(',')), ws(field_name)),
            ),
            |(low, high)| FieldAccessor::Range { low, high },
        ),
        map(ws(literal), FieldAccessor::Constant),
        map(ws(identifier), FieldAccessor::Field),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{combine_fields, field, join_fields, range_fields, values};

    fn parsed(input: &str) -> FieldAccessor {
        let (rest, acc) = parse_accessor(input).unwrap();
        assert!(rest.is_empty(), "unparsed: '{}'", rest);
        acc
    }

    #[test]
    fn test_field_forms() {
        assert_eq!(parsed("field(month)"), field("month"));
        assert_eq!(parsed(r#"field("order date")"#), field("order date"));
        assert_eq!(parsed(" month "), field("month"));
    }

    #[test]
    fn test_constants() {
        assert_eq!(parsed(r#"values("Total")"#), values("Total"));
        assert_eq!(parsed("values(3)"), values(3));
        assert_eq!(parsed(r#""Total""#), values("Total"));
        assert_eq!(parsed("true"), values(true));
    }

    #[test]
    fn test_join_and_combine() {
        assert_eq!(parsed(r#"join("-", year, month)"#), join_fields("-", ["year", "month"]));
        assert_eq!(
            parsed("combine(sum, ok, ko, timeout)"),
            combine_fields(Reducer::Sum, ["ok", "ko", "timeout"])
        );
        // unknown reducer: only the bare name "combine" is consumed
        let (rest, acc) = parse_accessor("combine(median, a)").unwrap();
        assert_eq!(acc, field("combine"));
        assert_eq!(rest, "(median, a)");
    }

    #[test]
    fn test_range() {
        assert_eq!(parsed("range(min, max)"), range_fields("min", "max"));
    }

    #[test]
    fn test_field_named_like_function() {
        // no parenthesis: a column called "range"
        assert_eq!(parsed("range"), field("range"));
    }
}
