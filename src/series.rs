use crate::accessor::{FieldAccessor, Record};
use crate::chart::CategoryConfig;
use crate::dataset::{hint, DataSet};
use crate::error::{ChartError, Result};
use crate::key::{display_value, number_value, CategoryKey, CategoryType};
use crate::model::{CommonChart, Point, Series};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub type IndexedNameFn = Arc<dyn Fn(&Record, usize) -> String + Send + Sync>;

/// How an output series is named
#[derive(Clone)]
pub enum SeriesName {
    Constant(String),
    /// Record-dependent: fans the definition out into one series per name
    Mapped(FieldAccessor),
    /// Receives the record and its position in the input
    Indexed(IndexedNameFn),
}

impl SeriesName {
    pub fn resolve(&self, record: &Record, index: usize) -> String {
        match self {
            SeriesName::Constant(s) => s.clone(),
            SeriesName::Mapped(acc) => display_value(&acc.evaluate(record)),
            SeriesName::Indexed(f) => f(record, index),
        }
    }
}

impl Default for SeriesName {
    fn default() -> Self {
        SeriesName::Constant(String::new())
    }
}

impl From<&str> for SeriesName {
    fn from(s: &str) -> Self {
        SeriesName::Constant(s.to_string())
    }
}

impl From<String> for SeriesName {
    fn from(s: String) -> Self {
        SeriesName::Constant(s)
    }
}

impl From<FieldAccessor> for SeriesName {
    fn from(acc: FieldAccessor) -> Self {
        match acc {
            FieldAccessor::Constant(Value::String(s)) => SeriesName::Constant(s),
            other => SeriesName::Mapped(other),
        }
    }
}

impl PartialEq for SeriesName {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SeriesName::Constant(a), SeriesName::Constant(b)) => a == b,
            (SeriesName::Mapped(a), SeriesName::Mapped(b)) => a == b,
            (SeriesName::Indexed(a), SeriesName::Indexed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for SeriesName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesName::Constant(s) => write!(f, "{:?}", s),
            SeriesName::Mapped(acc) => write!(f, "{:?}", acc),
            SeriesName::Indexed(_) => f.write_str("indexed(..)"),
        }
    }
}

/// Name series from the record and its input position
pub fn indexed<F>(f: F) -> SeriesName
where
    F: Fn(&Record, usize) -> String + Send + Sync + 'static,
{
    SeriesName::Indexed(Arc::new(f))
}

/// Point coordinates read from each record
#[derive(Debug, Clone, PartialEq)]
pub struct PointMapping {
    /// Category (or continuous x) accessor; may be supplied by the chart's
    /// category mapper instead
    pub x: Option<FieldAccessor>,
    pub y: FieldAccessor,
    pub z: Option<FieldAccessor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDefinition {
    pub name: SeriesName,
    pub data: PointMapping,
    pub color: Option<FieldAccessor>,
    pub stack: Option<FieldAccessor>,
}

impl SeriesDefinition {
    pub fn new(x: FieldAccessor, y: FieldAccessor) -> Self {
        Self::with_mapping(Some(x), y)
    }

    /// Definition relying on the chart's category mapper for x
    pub fn values_only(y: FieldAccessor) -> Self {
        Self::with_mapping(None, y)
    }

    fn with_mapping(x: Option<FieldAccessor>, y: FieldAccessor) -> Self {
        Self {
            name: SeriesName::default(),
            data: PointMapping { x, y, z: None },
            color: None,
            stack: None,
        }
    }

    pub fn named(mut self, name: impl Into<SeriesName>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_z(mut self, z: FieldAccessor) -> Self {
        self.data.z = Some(z);
        self
    }

    pub fn with_color(mut self, color: FieldAccessor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_stack(mut self, stack: FieldAccessor) -> Self {
        self.stack = Some(stack);
        self
    }

    /// Build the point for one record. `x` is the category value in
    /// categorical mode and the raw x in continuous mode.
    pub(crate) fn point(&self, record: &Record, x: Value, continuous: bool) -> Point {
        let y = self.data.y.evaluate(record);
        match &self.data.z {
            Some(z) => Point::Bubble {
                x,
                y,
                z: z.evaluate(record),
            },
            None if continuous => Point::Coord { x, y },
            None if y.is_null() => Point::Hole,
            None => Point::Scalar(y),
        }
    }
}

/// Series aligned on the distinct values of each definition's `x`.
///
/// In continuous mode every record becomes an `{x, y}` point and no
/// categories are enumerated.
pub fn series(records: &[Record], defs: &[SeriesDefinition], continuous: bool) -> Result<CommonChart> {
    build(records, defs, None, continuous)
}

/// Same cells as [`series`], with categories and series names swapped
pub fn pivot_series(records: &[Record], defs: &[SeriesDefinition], continuous: bool) -> Result<CommonChart> {
    Ok(series(records, defs, continuous)?.pivot())
}

pub(crate) fn build(
    records: &[Record],
    defs: &[SeriesDefinition],
    category: Option<&CategoryConfig>,
    continuous: bool,
) -> Result<CommonChart> {
    let mappers = category_mappers(defs, category)?;
    let kind = category.and_then(|c| c.kind);
    if continuous {
        Ok(build_continuous(records, defs, &mappers, kind))
    } else {
        Ok(build_categorical(records, defs, &mappers, kind))
    }
}

/// The grouping accessor of every definition: the chart's category mapper
/// when configured, the definition's own `x` otherwise
pub(crate) fn category_mappers<'d>(
    defs: &'d [SeriesDefinition],
    category: Option<&'d CategoryConfig>,
) -> Result<Vec<&'d FieldAccessor>> {
    defs.iter()
        .enumerate()
        .map(|(idx, def)| {
            category
                .map(|c| &c.mapper)
                .or(def.data.x.as_ref())
                .ok_or(ChartError::MissingCategory { series: idx })
        })
        .collect()
}

fn build_categorical(
    records: &[Record],
    defs: &[SeriesDefinition],
    mappers: &[&FieldAccessor],
    kind: Option<CategoryType>,
) -> CommonChart {
    // Definitions sharing an accessor share one grouping
    let mut sets: Vec<(&FieldAccessor, DataSet)> = Vec::new();
    let mut set_of = Vec::with_capacity(mappers.len());
    for &mapper in mappers {
        match sets.iter().position(|(m, _)| *m == mapper) {
            Some(pos) => set_of.push(pos),
            None => {
                sets.push((mapper, DataSet::new(records, mapper, kind)));
                set_of.push(sets.len() - 1);
            }
        }
    }

    let grouped: Vec<&DataSet> = sets.iter().map(|(_, s)| s).collect();
    let categories = DataSet::merge_labels(&grouped);

    let series = defs
        .iter()
        .zip(&set_of)
        .flat_map(|(def, &set)| sets[set].1.cells(def))
        .map(|cells| cells.align(&categories, &Point::Hole))
        .collect();

    CommonChart {
        categories,
        series,
        continuous: false,
    }
}

fn build_continuous(
    records: &[Record],
    defs: &[SeriesDefinition],
    mappers: &[&FieldAccessor],
    kind: Option<CategoryType>,
) -> CommonChart {
    let mut out: IndexMap<(usize, String), Series> = IndexMap::new();

    for (d, def) in defs.iter().enumerate() {
        for (idx, record) in records.iter().enumerate() {
            let name = def.name.resolve(record, idx);
            let x = continuous_x(mappers[d].evaluate(record), kind);
            let point = def.point(record, x, true);
            out.entry((d, name.clone()))
                .or_insert_with(|| Series {
                    name,
                    color: hint(def.color.as_ref(), record),
                    stack: hint(def.stack.as_ref(), record),
                    key: None,
                    data: Vec::new(),
                })
                .data
                .push(point);
        }
    }

    CommonChart {
        categories: Vec::new(),
        series: out.into_values().collect(),
        continuous: true,
    }
}

/// Coerce a continuous x value: dates to epoch milliseconds, numeric
/// strings to numbers
fn continuous_x(value: Value, kind: Option<CategoryType>) -> Value {
    match kind {
        Some(CategoryType::Date) | Some(CategoryType::Number) => {
            match CategoryKey::from_value(&value, kind) {
                CategoryKey::Date(ms) => Value::from(ms),
                CategoryKey::Number(n) => number_value(n),
                _ => value,
            }
        }
        _ => value,
    }
}
