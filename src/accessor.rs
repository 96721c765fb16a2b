// Field accessors: pure functions from a record to a value

use crate::key::{as_number, display_value, number_value};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A flat input record
pub type Record = Map<String, Value>;

pub type MapperFn = Arc<dyn Fn(&Record) -> Value + Send + Sync>;
pub type ReducerFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Folds the values of several fields into one
#[derive(Clone)]
pub enum Reducer {
    Sum,
    Min,
    Max,
    Mean,
    /// Non-empty values joined with no separator
    Concat,
    Custom(ReducerFn),
}

impl Reducer {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sum" => Some(Reducer::Sum),
            "min" => Some(Reducer::Min),
            "max" => Some(Reducer::Max),
            "mean" | "avg" => Some(Reducer::Mean),
            "concat" => Some(Reducer::Concat),
            _ => None,
        }
    }

    pub fn apply(&self, values: &[Value]) -> Value {
        let numbers = || values.iter().filter_map(as_number);
        match self {
            Reducer::Sum => fold_numbers(numbers(), |a, b| a + b),
            Reducer::Min => fold_numbers(numbers(), f64::min),
            Reducer::Max => fold_numbers(numbers(), f64::max),
            Reducer::Mean => {
                let nums: Vec<f64> = numbers().collect();
                if nums.is_empty() {
                    Value::Null
                } else {
                    number_value(nums.iter().sum::<f64>() / nums.len() as f64)
                }
            }
            Reducer::Concat => Value::String(values.iter().map(display_value).collect()),
            Reducer::Custom(f) => f(values),
        }
    }
}

fn fold_numbers(mut iter: impl Iterator<Item = f64>, op: impl Fn(f64, f64) -> f64) -> Value {
    match iter.next() {
        Some(first) => number_value(iter.fold(first, op)),
        None => Value::Null,
    }
}

impl PartialEq for Reducer {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Reducer::Custom(a), Reducer::Custom(b)) => Arc::ptr_eq(a, b),
            (Reducer::Custom(_), _) | (_, Reducer::Custom(_)) => false,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reducer::Sum => f.write_str("Sum"),
            Reducer::Min => f.write_str("Min"),
            Reducer::Max => f.write_str("Max"),
            Reducer::Mean => f.write_str("Mean"),
            Reducer::Concat => f.write_str("Concat"),
            Reducer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Declarative description of how to read one value out of a record.
///
/// Accessors never fail: a missing field reads as `Value::Null`.
#[derive(Clone)]
pub enum FieldAccessor {
    Field(String),
    Constant(Value),
    Join { separator: String, names: Vec<String> },
    Combine { reducer: Reducer, names: Vec<String> },
    Range { low: String, high: String },
    Mapper(MapperFn),
}

impl FieldAccessor {
    pub fn evaluate(&self, record: &Record) -> Value {
        match self {
            FieldAccessor::Field(name) => read(record, name),
            FieldAccessor::Constant(v) => v.clone(),
            FieldAccessor::Join { separator, names } => Value::String(
                names
                    .iter()
                    .map(|n| display_value(&read(record, n)))
                    .collect::<Vec<_>>()
                    .join(separator),
            ),
            FieldAccessor::Combine { reducer, names } => {
                let values: Vec<Value> = names.iter().map(|n| read(record, n)).collect();
                reducer.apply(&values)
            }
            FieldAccessor::Range { low, high } => {
                let (lo, hi) = (read(record, low), read(record, high));
                if lo.is_null() && hi.is_null() {
                    Value::Null
                } else {
                    Value::Array(vec![lo, hi])
                }
            }
            FieldAccessor::Mapper(f) => f(record),
        }
    }
}

fn read(record: &Record, name: &str) -> Value {
    record.get(name).cloned().unwrap_or(Value::Null)
}

impl PartialEq for FieldAccessor {
    fn eq(&self, other: &Self) -> bool {
        use FieldAccessor::*;
        match (self, other) {
            (Field(a), Field(b)) => a == b,
            (Constant(a), Constant(b)) => a == b,
            (Join { separator: s1, names: n1 }, Join { separator: s2, names: n2 }) => {
                s1 == s2 && n1 == n2
            }
            (Combine { reducer: r1, names: n1 }, Combine { reducer: r2, names: n2 }) => {
                r1 == r2 && n1 == n2
            }
            (Range { low: l1, high: h1 }, Range { low: l2, high: h2 }) => l1 == l2 && h1 == h2,
            (Mapper(a), Mapper(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldAccessor::Field(name) => write!(f, "field({})", name),
            FieldAccessor::Constant(v) => write!(f, "values({})", v),
            FieldAccessor::Join { separator, names } => {
                write!(f, "join({:?}, {})", separator, names.join(", "))
            }
            FieldAccessor::Combine { reducer, names } => {
                write!(f, "combine({:?}, {})", reducer, names.join(", "))
            }
            FieldAccessor::Range { low, high } => write!(f, "range({}, {})", low, high),
            FieldAccessor::Mapper(_) => f.write_str("mapper(..)"),
        }
    }
}

pub fn field(name: impl Into<String>) -> FieldAccessor {
    FieldAccessor::Field(name.into())
}

pub fn values(constant: impl Into<Value>) -> FieldAccessor {
    FieldAccessor::Constant(constant.into())
}

pub fn join_fields<S: Into<String>>(separator: &str, names: impl IntoIterator<Item = S>) -> FieldAccessor {
    FieldAccessor::Join {
        separator: separator.to_string(),
        names: names.into_iter().map(Into::into).collect(),
    }
}

pub fn combine_fields<S: Into<String>>(reducer: Reducer, names: impl IntoIterator<Item = S>) -> FieldAccessor {
    FieldAccessor::Combine {
        reducer,
        names: names.into_iter().map(Into::into).collect(),
    }
}

pub fn range_fields(low: impl Into<String>, high: impl Into<String>) -> FieldAccessor {
    FieldAccessor::Range {
        low: low.into(),
        high: high.into(),
    }
}

pub fn mapper<F>(f: F) -> FieldAccessor
where
    F: Fn(&Record) -> Value + Send + Sync + 'static,
{
    FieldAccessor::Mapper(Arc::new(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_field_and_missing() {
        let r = record(json!({"a": 1}));
        assert_eq!(field("a").evaluate(&r), json!(1));
        assert_eq!(field("b").evaluate(&r), Value::Null);
    }

    #[test]
    fn test_values_ignores_record() {
        let r = record(json!({"a": 1}));
        assert_eq!(values("fixed").evaluate(&r), json!("fixed"));
        assert_eq!(values(3).evaluate(&Record::new()), json!(3));
    }

    #[test]
    fn test_join_stringifies_missing_as_empty() {
        let r = record(json!({"a": "x", "c": 2}));
        let acc = join_fields("-", ["a", "b", "c"]);
        assert_eq!(acc.evaluate(&r), json!("x--2"));
    }

    #[test]
    fn test_combine_order_is_preserved() {
        let r = record(json!({"a": "1", "b": 2, "c": "z"}));
        assert_eq!(combine_fields(Reducer::Sum, ["a", "b"]).evaluate(&r), json!(3));
        assert_eq!(combine_fields(Reducer::Concat, ["c", "a"]).evaluate(&r), json!("z1"));

        let first = Reducer::Custom(Arc::new(|vs: &[Value]| vs[0].clone()));
        assert_eq!(combine_fields(first, ["c", "a"]).evaluate(&r), json!("z"));
    }

    #[test]
    fn test_combine_without_numbers() {
        let r = record(json!({"a": "x"}));
        assert_eq!(combine_fields(Reducer::Max, ["a", "b"]).evaluate(&r), Value::Null);
        assert_eq!(combine_fields(Reducer::Mean, ["a"]).evaluate(&r), Value::Null);
    }

    #[test]
    fn test_mean_reducer() {
        let r = record(json!({"a": 1, "b": 2}));
        assert_eq!(combine_fields(Reducer::Mean, ["a", "b"]).evaluate(&r), json!(1.5));
    }

    #[test]
    fn test_range_fields() {
        let r = record(json!({"lo": 1, "hi": 5}));
        assert_eq!(range_fields("lo", "hi").evaluate(&r), json!([1, 5]));
        assert_eq!(range_fields("lo", "missing").evaluate(&r), json!([1, null]));
        assert_eq!(range_fields("x", "y").evaluate(&r), Value::Null);
    }

    #[test]
    fn test_mapper_equality_is_identity() {
        let m = mapper(|r| r.get("a").cloned().unwrap_or(Value::Null));
        assert_eq!(m, m.clone());
        assert_ne!(m, mapper(|_| Value::Null));
        assert_eq!(field("a"), field("a"));
    }
}
