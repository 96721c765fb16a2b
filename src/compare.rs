use crate::accessor::{FieldAccessor, Record};
use crate::key::CategoryKey;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Sort direction for `xorder`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "asc" => Some(Order::Asc),
            "desc" => Some(Order::Desc),
            _ => None,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Order::Asc => ordering,
            Order::Desc => ordering.reverse(),
        }
    }
}

/// Total natural order over values.
///
/// Values compare through their inferred category key (numbers by value,
/// numeric-looking strings by value, digit runs inside text by magnitude).
/// Values that are distinct but key-equal, such as `1` and `1.0`, fall back
/// to their JSON text.
pub fn natural_cmp(a: &Value, b: &Value) -> Ordering {
    CategoryKey::infer(a)
        .cmp(&CategoryKey::infer(b))
        .then_with(|| {
            if a == b {
                Ordering::Equal
            } else {
                a.to_string().cmp(&b.to_string())
            }
        })
}

/// Comparator over records by the value `accessor` reads
pub fn natural_field_comparator(
    order: Order,
    accessor: FieldAccessor,
) -> impl Fn(&Record, &Record) -> Ordering + Send + Sync {
    move |a, b| order.apply(natural_cmp(&accessor.evaluate(a), &accessor.evaluate(b)))
}

/// First record of every distinct combination of accessor values, in input
/// order
pub fn distinct(records: &[Record], accessors: &[FieldAccessor]) -> Vec<Record> {
    let mut seen: HashSet<Vec<CategoryKey>> = HashSet::new();
    records
        .iter()
        .filter(|record| {
            let key = accessors
                .iter()
                .map(|acc| CategoryKey::infer(&acc.evaluate(record)))
                .collect();
            seen.insert(key)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::field;
    use serde_json::json;

    fn records(v: Value) -> Vec<Record> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_numeric_strings_sort_numerically() {
        let mut data = records(json!([{"n": "10"}, {"n": "2"}, {"n": "1"}]));
        let cmp = natural_field_comparator(Order::Asc, field("n"));
        data.sort_by(&cmp);
        let ns: Vec<_> = data.iter().map(|r| r["n"].clone()).collect();
        assert_eq!(ns, vec![json!("1"), json!("2"), json!("10")]);

        // idempotent
        let before = data.clone();
        data.sort_by(&cmp);
        assert_eq!(data, before);
    }

    #[test]
    fn test_descending() {
        let mut data = records(json!([{"n": 3}, {"n": 20}, {"n": 1}]));
        data.sort_by(natural_field_comparator(Order::Desc, field("n")));
        assert_eq!(data[0]["n"], json!(20));
        assert_eq!(data[2]["n"], json!(1));
    }

    #[test]
    fn test_total_order() {
        assert_ne!(natural_cmp(&json!(1), &json!(1.0)), Ordering::Equal);
        assert_ne!(natural_cmp(&json!(1), &json!("1")), Ordering::Equal);
        assert_eq!(natural_cmp(&json!("a"), &json!("a")), Ordering::Equal);
        assert_eq!(natural_cmp(&Value::Null, &json!(0)), Ordering::Less);
    }

    #[test]
    fn test_mixed_text_is_natural() {
        let mut vs = vec![json!("step 10"), json!("step 9"), json!("step 1")];
        vs.sort_by(natural_cmp);
        assert_eq!(vs, vec![json!("step 1"), json!("step 9"), json!("step 10")]);
    }

    #[test]
    fn test_distinct_keeps_first() {
        let data = records(json!([
            {"a": 1, "b": "x", "i": 0},
            {"a": 1, "b": "y", "i": 1},
            {"a": 1, "b": "x", "i": 2},
            {"a": 2, "b": "x", "i": 3}
        ]));
        let out = distinct(&data, &[field("a"), field("b")]);
        let ids: Vec<_> = out.iter().map(|r| r["i"].clone()).collect();
        assert_eq!(ids, vec![json!(0), json!(1), json!(3)]);

        assert_eq!(distinct(&data, &[]).len(), 1);
        assert!(distinct(&[], &[field("a")]).is_empty());
    }
}
