use crate::key::CategoryKey;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

// =============================================================================
// Chart model handed to rendering adapters
// =============================================================================

/// Library-independent chart: ordered categories plus aligned named series.
///
/// In categorical mode (`continuous == false`) every series holds exactly one
/// point per category. In continuous mode points are coordinate pairs and
/// `categories` is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CommonChart {
    pub categories: Vec<CategoryKey>,
    pub series: Vec<Series>,
    #[serde(rename = "continue")]
    pub continuous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Render-time stacking group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Category this series was pivoted from, when its name alone does not
    /// restore it (numbers, dates, booleans, renamed duplicates)
    #[serde(skip)]
    pub key: Option<CategoryKey>,
    pub data: Vec<Point>,
}

impl Series {
    pub fn new(name: impl Into<String>, data: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            color: None,
            stack: None,
            key: None,
            data,
        }
    }

    /// Series standing for category `key`
    fn from_key(key: &CategoryKey, data: Vec<Point>) -> Self {
        let name = key.to_string();
        let key = (*key != CategoryKey::Text(name.clone())).then(|| key.clone());
        Self {
            key,
            ..Series::new(name, data)
        }
    }

    /// Category key this series becomes when pivoted
    fn category_key(&self) -> CategoryKey {
        self.key.clone().unwrap_or_else(|| CategoryKey::Text(self.name.clone()))
    }
}

/// A single plotted value. `Hole` marks a missing combination and
/// serializes as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Point {
    #[default]
    Hole,
    Scalar(Value),
    Coord { x: Value, y: Value },
    Bubble { x: Value, y: Value, z: Value },
}

impl Point {
    pub fn is_hole(&self) -> bool {
        matches!(self, Point::Hole)
    }

    /// x coordinate for coordinate points
    pub fn x(&self) -> Option<&Value> {
        match self {
            Point::Coord { x, .. } | Point::Bubble { x, .. } => Some(x),
            _ => None,
        }
    }

    fn with_x(self, x: Value) -> Self {
        match self {
            Point::Coord { y, .. } => Point::Coord { x, y },
            Point::Bubble { y, z, .. } => Point::Bubble { x, y, z },
            other => other,
        }
    }
}

impl CommonChart {
    pub fn empty(continuous: bool) -> Self {
        Self {
            continuous,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.series.is_empty()
    }

    /// Structural transpose: series names become categories and categories
    /// become series names.
    ///
    /// Every (category, series) cell keeps its value and category keys keep
    /// their type, so applying it twice restores the chart. Series sharing a
    /// name become distinct categories, later ones suffixed `#2`, `#3`, ...
    /// Colour and stack hints describe the original series and are dropped.
    pub fn pivot(&self) -> CommonChart {
        if self.continuous {
            return self.pivot_coordinates();
        }

        let columns = self.column_keys();
        let series = self
            .categories
            .iter()
            .enumerate()
            .map(|(row, category)| {
                let data = self
                    .series
                    .iter()
                    .map(|s| s.data.get(row).cloned().unwrap_or_default())
                    .collect();
                Series::from_key(category, data)
            })
            .collect();

        CommonChart {
            categories: columns,
            series,
            continuous: false,
        }
    }

    /// One unique category key per series, in series order
    fn column_keys(&self) -> Vec<CategoryKey> {
        let mut seen: IndexSet<CategoryKey> = IndexSet::with_capacity(self.series.len());
        for s in &self.series {
            let mut key = s.category_key();
            let mut n = 1;
            while seen.contains(&key) {
                n += 1;
                key = CategoryKey::Text(format!("{}#{}", s.name, n));
            }
            seen.insert(key);
        }
        seen.into_iter().collect()
    }

    fn pivot_coordinates(&self) -> CommonChart {
        let columns = self.column_keys();
        let mut groups: IndexMap<CategoryKey, Vec<Point>> = IndexMap::new();
        for (s, column) in self.series.iter().zip(&columns) {
            for p in &s.data {
                let Some(x) = p.x() else { continue };
                groups
                    .entry(CategoryKey::infer(x))
                    .or_default()
                    .push(p.clone().with_x(column.to_value()));
            }
        }

        CommonChart {
            categories: Vec::new(),
            series: groups
                .into_iter()
                .map(|(key, data)| Series::from_key(&key, data))
                .collect(),
            continuous: true,
        }
    }

    /// Cell lookup by category and series name (categorical mode)
    pub fn value_at(&self, category: &CategoryKey, series: &str) -> Option<&Point> {
        let row = self.categories.iter().position(|c| c == category)?;
        self.series
            .iter()
            .rev()
            .find(|s| s.name == series)
            .and_then(|s| s.data.get(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CommonChart {
        CommonChart {
            categories: vec!["A".into(), "B".into()],
            series: vec![
                Series::new("S1", vec![Point::Scalar(json!(1)), Point::Hole]),
                Series::new("S2", vec![Point::Hole, Point::Scalar(json!(2))]),
            ],
            continuous: false,
        }
    }

    #[test]
    fn test_serialize_shape() {
        let mut chart = sample();
        chart.series[0].stack = Some("g".to_string());
        let v = serde_json::to_value(&chart).unwrap();
        assert_eq!(
            v,
            json!({
                "categories": ["A", "B"],
                "series": [
                    {"name": "S1", "stack": "g", "data": [1, null]},
                    {"name": "S2", "data": [null, 2]}
                ],
                "continue": false
            })
        );
    }

    #[test]
    fn test_serialize_points() {
        let p = Point::Coord { x: json!(1), y: json!([2, 3]) };
        assert_eq!(serde_json::to_value(&p).unwrap(), json!({"x": 1, "y": [2, 3]}));
        let b = Point::Bubble { x: json!("a"), y: json!(2), z: json!(9) };
        assert_eq!(serde_json::to_value(&b).unwrap(), json!({"x": "a", "y": 2, "z": 9}));
    }

    #[test]
    fn test_pivot_transposes() {
        let pivoted = sample().pivot();
        assert_eq!(pivoted.categories, vec![CategoryKey::from("S1"), CategoryKey::from("S2")]);
        assert_eq!(pivoted.series.len(), 2);
        assert_eq!(pivoted.series[0].name, "A");
        assert_eq!(pivoted.series[0].data, vec![Point::Scalar(json!(1)), Point::Hole]);
        assert_eq!(pivoted.series[1].data, vec![Point::Hole, Point::Scalar(json!(2))]);
    }

    #[test]
    fn test_pivot_twice_restores() {
        let chart = sample();
        assert_eq!(chart.pivot().pivot(), chart);
    }

    #[test]
    fn test_pivot_coordinates() {
        let chart = CommonChart {
            categories: vec![],
            series: vec![Series::new(
                "north",
                vec![
                    Point::Coord { x: json!(1), y: json!(10) },
                    Point::Coord { x: json!(2), y: json!(20) },
                ],
            )],
            continuous: true,
        };
        let pivoted = chart.pivot();
        assert_eq!(pivoted.series.len(), 2);
        assert_eq!(pivoted.series[0].name, "1");
        assert_eq!(pivoted.series[0].data, vec![Point::Coord { x: json!("north"), y: json!(10) }]);
        assert_eq!(pivoted.pivot(), chart);
    }

    #[test]
    fn test_pivot_keeps_duplicate_names_apart() {
        let chart = CommonChart {
            categories: vec!["jan".into()],
            series: vec![
                Series::new("", vec![Point::Scalar(json!(1))]),
                Series::new("", vec![Point::Scalar(json!(2))]),
                Series::new("", vec![Point::Hole]),
            ],
            continuous: false,
        };
        let pivoted = chart.pivot();
        assert_eq!(
            pivoted.categories,
            vec![CategoryKey::from(""), CategoryKey::from("#2"), CategoryKey::from("#3")]
        );
        assert_eq!(
            pivoted.series[0].data,
            vec![Point::Scalar(json!(1)), Point::Scalar(json!(2)), Point::Hole]
        );
    }

    #[test]
    fn test_pivot_twice_keeps_key_types() {
        let chart = CommonChart {
            categories: vec![
                CategoryKey::Number(2020.0),
                CategoryKey::Number(2021.0),
                CategoryKey::Date(1_704_067_200_000),
                CategoryKey::Bool(true),
                "2022".into(),
            ],
            series: vec![Series::new(
                "sales",
                vec![
                    Point::Scalar(json!(1)),
                    Point::Hole,
                    Point::Scalar(json!(3)),
                    Point::Scalar(json!(4)),
                    Point::Scalar(json!(5)),
                ],
            )],
            continuous: false,
        };
        let pivoted = chart.pivot();
        let names: Vec<_> = pivoted.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["2020", "2021", "2024-01-01", "true", "2022"]);
        assert_eq!(pivoted.series[4].key, None);

        let restored = pivoted.pivot();
        assert_eq!(restored, chart);
        assert_eq!(
            serde_json::to_value(&restored).unwrap()["categories"],
            json!([2020, 2021, "2024-01-01", true, "2022"])
        );
    }

    #[test]
    fn test_pivot_drops_hints() {
        let mut chart = sample();
        chart.series[0].color = Some("#f00".to_string());
        chart.series[0].stack = Some("g".to_string());
        let pivoted = chart.pivot();
        assert!(pivoted.series.iter().all(|s| s.color.is_none() && s.stack.is_none()));
    }

    #[test]
    fn test_value_at() {
        let chart = sample();
        assert_eq!(chart.value_at(&"B".into(), "S2"), Some(&Point::Scalar(json!(2))));
        assert_eq!(chart.value_at(&"C".into(), "S2"), None);
    }
}
