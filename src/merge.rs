use serde_json::Value;

/// Layer `sources` onto `target`, left to right.
///
/// Objects merge key by key, recursively. Arrays and scalars replace what
/// is there. A `null` in a source means "no override". Only `target` is
/// modified.
pub fn merge_deep(target: &mut Value, sources: &[&Value]) {
    for source in sources {
        merge_value(target, source);
    }
}

fn merge_value(target: &mut Value, source: &Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                if value.is_null() {
                    continue;
                }
                let nested = value.is_object() && dst.get(key).is_some_and(Value::is_object);
                match dst.get_mut(key) {
                    Some(existing) if nested => merge_value(existing, value),
                    _ => {
                        dst.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (dst, src) => *dst = src.clone(),
    }
}
