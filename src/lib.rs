// Library exports for gramchart

pub mod accessor;
pub mod compare;
pub mod data;
pub mod error;
pub mod key;
pub mod merge;
pub mod parser;
pub mod preprocessor;

// Chart engine
pub mod chart;
pub mod dataset;
pub mod model;
pub mod series;

pub use accessor::{
    combine_fields, field, join_fields, mapper, range_fields, values, FieldAccessor, Record, Reducer,
};
pub use chart::{build_chart, build_single_serie_chart, CategoryConfig, ChartConfig};
pub use compare::{distinct, natural_cmp, natural_field_comparator, Order};
pub use data::{read_records, InputFormat};
pub use dataset::DataSet;
pub use error::{ChartError, Result};
pub use key::{CategoryKey, CategoryType};
pub use merge::merge_deep;
pub use model::{CommonChart, Point, Series};
pub use parser::parse_chart_config;
pub use series::{indexed, pivot_series, series, PointMapping, SeriesDefinition, SeriesName};
