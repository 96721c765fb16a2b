use thiserror::Error;

/// Errors raised while loading records or assembling a chart
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("series #{series} has no x mapping and no category mapper is configured")]
    MissingCategory { series: usize },

    #[error("chart configuration declares no series")]
    NoSeries,

    #[error("single-series chart accepts exactly one series definition, got {count}")]
    MultipleSeries { count: usize },

    #[error("unsupported dimension: {0}")]
    UnsupportedDimension(String),

    #[error("pipeline parse error: {0}")]
    Parse(String),

    #[error("variable '${0}' not defined")]
    Variable(String),

    #[error("invalid records: {0}")]
    InvalidRecords(String),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;
