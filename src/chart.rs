use crate::accessor::{FieldAccessor, Record};
use crate::compare::Order;
use crate::dataset::{hint, DataSet};
use crate::error::{ChartError, Result};
use crate::key::{as_number, number_value, CategoryKey, CategoryType};
use crate::model::{CommonChart, Point, Series};
use crate::series::{self, SeriesDefinition};
use serde_json::Value;

/// Category axis mapping shared by every series
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryConfig {
    pub mapper: FieldAccessor,
    pub kind: Option<CategoryType>,
}

impl CategoryConfig {
    pub fn new(mapper: FieldAccessor) -> Self {
        Self { mapper, kind: None }
    }

    pub fn of_type(mapper: FieldAccessor, kind: CategoryType) -> Self {
        Self {
            mapper,
            kind: Some(kind),
        }
    }
}

/// Everything the engine needs to turn records into a chart
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartConfig {
    pub series: Vec<SeriesDefinition>,
    /// Overrides every definition's `x` for grouping
    pub category: Option<CategoryConfig>,
    /// Coordinate points for a numeric/datetime x axis
    pub continuous: bool,
    pub pivot: bool,
    pub xorder: Option<Order>,
}

impl ChartConfig {
    pub fn new(series: Vec<SeriesDefinition>) -> Self {
        Self {
            series,
            ..Default::default()
        }
    }
}

/// Main entry point: build the chart for `records`.
///
/// `previous` is the chart from the last call and is currently unused; the
/// result is always recomputed from scratch.
pub fn build_chart(
    records: &[Record],
    config: &ChartConfig,
    previous: Option<&CommonChart>,
) -> Result<CommonChart> {
    if previous.is_some() {
        log::trace!("Ignoring previous chart, rebuilding from {} records", records.len());
    }

    let chart = series::build(records, &config.series, config.category.as_ref(), config.continuous)?;
    let chart = if config.pivot { chart.pivot() } else { chart };
    let chart = match config.xorder {
        Some(order) => sort_chart(chart, order),
        None => chart,
    };

    log::trace!(
        "Built chart: {} categories, {} series, continuous={}",
        chart.categories.len(),
        chart.series.len(),
        chart.continuous
    );
    Ok(chart)
}

/// Build a one-series chart (pie, donut, funnel, pyramid).
///
/// Exactly one series definition is accepted. Records of every fan-out
/// name are collapsed: numeric values of a category are summed, otherwise
/// the last non-null value is kept.
pub fn build_single_serie_chart(
    records: &[Record],
    config: &ChartConfig,
    previous: Option<&CommonChart>,
) -> Result<CommonChart> {
    let def = match config.series.as_slice() {
        [] => return Err(ChartError::NoSeries),
        [def] => def,
        defs => return Err(ChartError::MultipleSeries { count: defs.len() }),
    };
    if def.data.z.is_some() {
        return Err(ChartError::UnsupportedDimension(
            "a single-series chart cannot map a z value".to_string(),
        ));
    }
    if let FieldAccessor::Range { low, high } = &def.data.y {
        return Err(ChartError::UnsupportedDimension(format!(
            "a single-series chart takes one y value, got range({}, {})",
            low, high
        )));
    }
    if config.pivot || config.continuous {
        log::warn!("Ignoring pivot/continue flags for a single-series chart");
    }
    if previous.is_some() {
        log::trace!("Ignoring previous chart, rebuilding from {} records", records.len());
    }

    let mappers = series::category_mappers(&config.series, config.category.as_ref())?;
    let kind = config.category.as_ref().and_then(|c| c.kind);
    let dataset = DataSet::new(records, mappers[0], kind);

    let data: Vec<Point> = dataset
        .groups()
        .map(|(_, indices)| collapse(indices.iter().map(|&i| def.data.y.evaluate(&records[i]))))
        .collect();

    // Hints come from the first record that made it into a category
    let first = dataset.groups().next().map(|(_, indices)| indices[0]);
    let name = match first {
        Some(idx) => def.name.resolve(&records[idx], idx),
        None => String::new(),
    };

    let chart = CommonChart {
        categories: dataset.labels().cloned().collect(),
        series: if data.is_empty() {
            Vec::new()
        } else {
            vec![Series {
                name,
                color: first.and_then(|idx| hint(def.color.as_ref(), &records[idx])),
                stack: None,
                key: None,
                data,
            }]
        },
        continuous: false,
    };

    Ok(match config.xorder {
        Some(order) => sort_chart(chart, order),
        None => chart,
    })
}

fn collapse(values: impl Iterator<Item = Value>) -> Point {
    let mut sum: Option<f64> = None;
    let mut last: Option<Value> = None;
    let mut numeric = true;

    for v in values.filter(|v| !v.is_null()) {
        match (numeric, &v) {
            (true, Value::Number(_)) => {
                sum = Some(sum.unwrap_or(0.0) + as_number(&v).unwrap_or(0.0));
            }
            _ => numeric = false,
        }
        last = Some(v);
    }

    match (numeric, sum, last) {
        (true, Some(total), _) => Point::Scalar(number_value(total)),
        (_, _, Some(v)) => Point::Scalar(v),
        _ => Point::Hole,
    }
}

/// Apply `xorder`: categories (and the aligned data with them) in
/// categorical mode, each series' points in continuous mode
fn sort_chart(mut chart: CommonChart, order: Order) -> CommonChart {
    if chart.continuous {
        for s in &mut chart.series {
            s.data.sort_by(|a, b| {
                let key = |p: &Point| p.x().map(CategoryKey::infer).unwrap_or(CategoryKey::Null);
                order.apply(key(a).cmp(&key(b)))
            });
        }
        return chart;
    }

    let mut perm: Vec<usize> = (0..chart.categories.len()).collect();
    perm.sort_by(|&a, &b| order.apply(chart.categories[a].cmp(&chart.categories[b])));

    chart.categories = perm.iter().map(|&i| chart.categories[i].clone()).collect();
    for s in &mut chart.series {
        s.data = perm.iter().map(|&i| s.data[i].clone()).collect();
    }
    chart
}
