// Chart pipeline DSL parser

pub mod accessor;
pub mod command;
pub mod lexer;
pub mod pipeline;

use crate::chart::ChartConfig;
use crate::error::{ChartError, Result};

// Public API re-exports
pub use accessor::parse_accessor;
pub use pipeline::parse_pipeline;

/// Parse a whole pipeline string into a [`ChartConfig`]
pub fn parse_chart_config(input: &str) -> Result<ChartConfig> {
    match parse_pipeline(input) {
        Ok((_, config)) => Ok(config),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(ChartError::Parse(format!(
            "{:?} near '{}'",
            e.code,
            e.input.chars().take(32).collect::<String>()
        ))),
        Err(nom::Err::Incomplete(_)) => Err(ChartError::Parse("incomplete input".to_string())),
    }
}
