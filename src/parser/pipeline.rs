// Pipeline parser: component | component | ...

use super::command::{parse_category, parse_continue, parse_pivot, parse_series, parse_xorder};
use super::lexer::ws;
use crate::chart::{CategoryConfig, ChartConfig};
use crate::compare::Order;
use crate::series::SeriesDefinition;
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{eof, map, opt},
    error::{Error, ErrorKind},
    multi::separated_list1,
    IResult,
};

#[derive(Debug)]
enum PipelineComponent {
    Series(SeriesDefinition),
    Category(CategoryConfig),
    Continue,
    Pivot,
    XOrder(Order),
}

fn parse_pipeline_component(input: &str) -> IResult<&str, PipelineComponent> {
    alt((
        map(parse_series, PipelineComponent::Series),
        map(parse_category, PipelineComponent::Category),
        map(parse_continue, |_| PipelineComponent::Continue),
        map(parse_pivot, |_| PipelineComponent::Pivot),
        map(parse_xorder, PipelineComponent::XOrder),
    ))(input)
}

/// Parse a complete chart configuration
/// Format: series(...) | series(...) | category(...) | pivot() | xorder(asc)
pub fn parse_pipeline(input: &str) -> IResult<&str, ChartConfig> {
    // Optional leading "|"
    let (input, _) = opt(ws(tag("|")))(input)?;

    let (input, components) = separated_list1(ws(tag("|")), parse_pipeline_component)(input)?;

    let (input, _) = ws(eof)(input)?;

    let mut config = ChartConfig::default();
    for comp in components {
        match comp {
            PipelineComponent::Series(def) => config.series.push(def),
            // Last one wins
            PipelineComponent::Category(c) => config.category = Some(c),
            PipelineComponent::Continue => config.continuous = true,
            PipelineComponent::Pivot => config.pivot = true,
            PipelineComponent::XOrder(o) => config.xorder = Some(o),
        }
    }

    // Validation: Must have at least one series
    if config.series.is_empty() {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }

    Ok((input, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::field;
    use crate::key::CategoryType;

    #[test]
    fn test_parse_single_series() {
        let (_, config) = parse_pipeline("series(x: month, y: amount)").unwrap();
        assert_eq!(config.series.len(), 1);
        assert!(!config.continuous);
        assert!(!config.pivot);
        assert!(config.xorder.is_none());
    }

    #[test]
    fn test_parse_full_pipeline() {
        let input = r#"series(name: "ok", y: ok) | series(name: "ko", y: ko)
            | category(field(day), type: date) | pivot() | xorder(desc)"#;
        let (_, config) = parse_pipeline(input).unwrap();
        assert_eq!(config.series.len(), 2);
        let category = config.category.unwrap();
        assert_eq!(category.mapper, field("day"));
        assert_eq!(category.kind, Some(CategoryType::Date));
        assert!(config.pivot);
        assert_eq!(config.xorder, Some(Order::Desc));
    }

    #[test]
    fn test_parse_continue() {
        let (_, config) = parse_pipeline("| series(x: t, y: v) | continue()").unwrap();
        assert!(config.continuous);
    }

    #[test]
    fn test_parse_requires_series() {
        assert!(parse_pipeline("category(day) | pivot()").is_err());
        assert!(parse_pipeline("").is_err());
    }

    #[test]
    fn test_parse_trailing_pipe() {
        assert!(parse_pipeline("series(y: v) |").is_err());
    }

    #[test]
    fn test_parse_unknown_component() {
        assert!(parse_pipeline("series(y: v) | stack()").is_err());
    }
}
