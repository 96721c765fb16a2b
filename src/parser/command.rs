// Pipeline commands: series(...), category(...), continue(), pivot(), xorder(...)

use super::accessor::parse_accessor;
use super::lexer::{identifier, key, string_literal, ws};
use crate::accessor::FieldAccessor;
use crate::chart::CategoryConfig;
use crate::compare::Order;
use crate::key::CategoryType;
use crate::series::{PointMapping, SeriesDefinition, SeriesName};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, map_opt, opt},
    error::{Error, ErrorKind},
    multi::separated_list0,
    sequence::{delimited, preceded},
    IResult,
};

/// Parse a series definition
/// Format: series(y: amount) or series(name: status, x: month, y: count, stack: "all", ...)
pub fn parse_series(input: &str) -> IResult<&str, SeriesDefinition> {
    let (input, _) = ws(tag("series"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, args) = separated_list0(
        ws(char(',')),
        alt((
            map(preceded(key("name"), parse_accessor), |a| ("name", a)),
            map(preceded(key("x"), parse_accessor), |a| ("x", a)),
            map(preceded(key("y"), parse_accessor), |a| ("y", a)),
            map(preceded(key("z"), parse_accessor), |a| ("z", a)),
            map(preceded(key("color"), parse_accessor), |a| ("color", a)),
            map(preceded(key("stack"), parse_accessor), |a| ("stack", a)),
        )),
    )(input)?;

    let (rest, _) = ws(char(')'))(input)?;

    let mut name = SeriesName::default();
    let mut x = None;
    let mut y: Option<FieldAccessor> = None;
    let mut z = None;
    let mut color = None;
    let mut stack = None;

    for (arg, acc) in args {
        match arg {
            "name" => name = SeriesName::from(acc),
            "x" => x = Some(acc),
            "y" => y = Some(acc),
            "z" => z = Some(acc),
            "color" => color = Some(acc),
            "stack" => stack = Some(acc),
            _ => {}
        }
    }

    // y is the only mandatory mapping
    let Some(y) = y else {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    };

    Ok((
        rest,
        SeriesDefinition {
            name,
            data: PointMapping { x, y, z },
            color,
            stack,
        },
    ))
}

fn category_type(input: &str) -> IResult<&str, CategoryType> {
    map_opt(alt((string_literal, identifier)), |s| CategoryType::parse(&s))(input)
}

/// Parse the shared category axis
/// Format: category(month) or category(field(day), type: date)
pub fn parse_category(input: &str) -> IResult<&str, CategoryConfig> {
    let (input, _) = ws(tag("category"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, mapper) = parse_accessor(input)?;
    let (input, kind) = opt(preceded(ws(char(',')), preceded(key("type"), ws(category_type))))(input)?;
    let (input, _) = ws(char(')'))(input)?;

    Ok((input, CategoryConfig { mapper, kind }))
}

/// `name()` flag without arguments
fn flag<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    map(preceded(ws(tag(name)), preceded(ws(char('(')), ws(char(')')))), |_| ())
}

pub fn parse_continue(input: &str) -> IResult<&str, ()> {
    flag("continue")(input)
}

pub fn parse_pivot(input: &str) -> IResult<&str, ()> {
    flag("pivot")(input)
}

/// Format: xorder(asc) or xorder("desc")
pub fn parse_xorder(input: &str) -> IResult<&str, Order> {
    preceded(
        ws(tag("xorder")),
        delimited(
            ws(char('(')),
            map_opt(ws(alt((string_literal, identifier))), |s| Order::parse(&s)),
            ws(char(')')),
        ),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{field, values};

    #[test]
    fn test_parse_series_minimal() {
        let (_, def) = parse_series("series(y: amount)").unwrap();
        assert_eq!(def.data.y, field("amount"));
        assert!(def.data.x.is_none());
        assert_eq!(def.name, SeriesName::default());
    }

    #[test]
    fn test_parse_series_full() {
        let (rest, def) = parse_series(
            r##"series(name: status, x: month, y: count, z: weight, color: "#123456", stack: values("all"))"##,
        )
        .unwrap();
        assert!(rest.is_empty());
        assert_eq!(def.name, SeriesName::Mapped(field("status")));
        assert_eq!(def.data.x, Some(field("month")));
        assert_eq!(def.data.z, Some(field("weight")));
        assert_eq!(def.color, Some(values("#123456")));
        assert_eq!(def.stack, Some(values("all")));
    }

    #[test]
    fn test_parse_series_constant_name() {
        let (_, def) = parse_series(r#"series(name: "Revenue", y: amount)"#).unwrap();
        assert_eq!(def.name, SeriesName::Constant("Revenue".to_string()));
    }

    #[test]
    fn test_parse_series_requires_y() {
        assert!(parse_series("series(x: month)").is_err());
        assert!(parse_series("series(y: a, w: b)").is_err());
    }

    #[test]
    fn test_parse_category() {
        let (_, cat) = parse_category("category(day, type: date)").unwrap();
        assert_eq!(cat.mapper, field("day"));
        assert_eq!(cat.kind, Some(CategoryType::Date));

        let (_, cat) = parse_category(r#"category(join("/", y, m))"#).unwrap();
        assert!(cat.kind.is_none());

        assert!(parse_category("category(day, type: week)").is_err());
    }

    #[test]
    fn test_parse_flags_and_order() {
        assert!(parse_continue("continue()").is_ok());
        assert!(parse_pivot(" pivot ( ) ").is_ok());
        assert_eq!(parse_xorder("xorder(desc)").unwrap().1, Order::Desc);
        assert_eq!(parse_xorder(r#"xorder("asc")"#).unwrap().1, Order::Asc);
        assert!(parse_xorder("xorder(up)").is_err());
    }
}
