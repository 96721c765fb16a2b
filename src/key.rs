use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// How raw values are normalized into category keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryType {
    Date,
    String,
    Number,
}

impl CategoryType {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "date" => Some(CategoryType::Date),
            "string" => Some(CategoryType::String),
            "number" => Some(CategoryType::Number),
            _ => None,
        }
    }
}

/// A de-duplicable x-axis key.
///
/// Equality is value equality: numbers compare by value (`-0.0 == 0.0`) and
/// dates by their epoch-millisecond timestamp. Ordering is the natural order
/// used by `xorder`: `Null < Bool < Number < Date < Text`, with numeric-looking
/// text ahead of other text and digit runs compared by value.
#[derive(Debug, Clone)]
pub enum CategoryKey {
    Null,
    Bool(bool),
    Number(f64),
    /// Milliseconds since the Unix epoch, UTC
    Date(i64),
    Text(String),
}

impl CategoryKey {
    /// Normalize a raw value, optionally coercing it to `kind`
    pub fn from_value(value: &Value, kind: Option<CategoryType>) -> Self {
        match (kind, value) {
            (_, Value::Null) => CategoryKey::Null,
            (Some(CategoryType::Date), Value::Number(n)) => match n.as_f64() {
                Some(ms) => CategoryKey::Date(ms as i64),
                None => Self::infer(value),
            },
            (Some(CategoryType::Date), Value::String(s)) => match parse_date(s) {
                Some(ms) => CategoryKey::Date(ms),
                None => {
                    log::warn!("Cannot parse '{}' as a date, keeping it as text", s);
                    CategoryKey::Text(s.clone())
                }
            },
            (Some(CategoryType::Number), Value::String(s)) => match parse_number(s) {
                Some(n) => CategoryKey::Number(n),
                None => CategoryKey::Text(s.clone()),
            },
            (Some(CategoryType::String), v) => CategoryKey::Text(display_value(v)),
            (_, v) => Self::infer(v),
        }
    }

    /// Key derived from the JSON type alone
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Null => CategoryKey::Null,
            Value::Bool(b) => CategoryKey::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => CategoryKey::Number(f),
                None => CategoryKey::Text(n.to_string()),
            },
            Value::String(s) => CategoryKey::Text(s.clone()),
            other => CategoryKey::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CategoryKey::Null)
    }

    /// JSON form handed to rendering adapters
    pub fn to_value(&self) -> Value {
        match self {
            CategoryKey::Null => Value::Null,
            CategoryKey::Bool(b) => Value::Bool(*b),
            CategoryKey::Number(f) => number_value(*f),
            CategoryKey::Date(ms) => Value::String(format_date(*ms)),
            CategoryKey::Text(s) => Value::String(s.clone()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CategoryKey::Null => 0,
            CategoryKey::Bool(_) => 1,
            CategoryKey::Number(_) => 2,
            CategoryKey::Date(_) => 3,
            CategoryKey::Text(_) => 4,
        }
    }
}

impl PartialEq for CategoryKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CategoryKey::Null, CategoryKey::Null) => true,
            (CategoryKey::Bool(a), CategoryKey::Bool(b)) => a == b,
            (CategoryKey::Number(a), CategoryKey::Number(b)) => {
                normalize_zero(*a).to_bits() == normalize_zero(*b).to_bits()
            }
            (CategoryKey::Date(a), CategoryKey::Date(b)) => a == b,
            (CategoryKey::Text(a), CategoryKey::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CategoryKey {}

impl Hash for CategoryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            CategoryKey::Null => {}
            CategoryKey::Bool(b) => b.hash(state),
            CategoryKey::Number(f) => normalize_zero(*f).to_bits().hash(state),
            CategoryKey::Date(ms) => ms.hash(state),
            CategoryKey::Text(s) => s.hash(state),
        }
    }
}

impl Ord for CategoryKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CategoryKey::Bool(a), CategoryKey::Bool(b)) => a.cmp(b),
            (CategoryKey::Number(a), CategoryKey::Number(b)) => {
                normalize_zero(*a).total_cmp(&normalize_zero(*b))
            }
            (CategoryKey::Date(a), CategoryKey::Date(b)) => a.cmp(b),
            (CategoryKey::Text(a), CategoryKey::Text(b)) => natural_str_cmp(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for CategoryKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKey::Null => Ok(()),
            CategoryKey::Bool(b) => write!(f, "{}", b),
            CategoryKey::Number(n) => write!(f, "{}", number_value(*n)),
            CategoryKey::Date(ms) => f.write_str(&format_date(*ms)),
            CategoryKey::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for CategoryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<&str> for CategoryKey {
    fn from(s: &str) -> Self {
        CategoryKey::Text(s.to_string())
    }
}

impl From<f64> for CategoryKey {
    fn from(n: f64) -> Self {
        CategoryKey::Number(n)
    }
}

/// Text form of a value: `null` is the empty string, strings are unquoted
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric reading of a value; numeric strings count
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Integral floats become JSON integers so `2020.0` prints as `2020`
pub fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

pub(crate) fn parse_date(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn format_date(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) if dt.num_seconds_from_midnight() == 0 && dt.timestamp_subsec_millis() == 0 => {
            dt.format("%Y-%m-%d").to_string()
        }
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        None => ms.to_string(),
    }
}

fn normalize_zero(f: f64) -> f64 {
    if f == 0.0 {
        0.0
    } else {
        f
    }
}

/// Natural text order.
///
/// Numeric-looking strings sort first, by value. Other strings compare chunk
/// by chunk, digit runs by magnitude. Raw byte order breaks remaining ties so
/// only identical strings compare equal.
pub fn natural_str_cmp(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => chunked_cmp(a, b).then_with(|| a.cmp(b)),
    }
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

impl Chunk<'_> {
    // Text chunks starting below '0' sort before digit runs, the rest after
    fn class(&self) -> u8 {
        match self {
            Chunk::Digits(_) => 1,
            Chunk::Text(t) if t.as_bytes()[0] < b'0' => 0,
            Chunk::Text(_) => 2,
        }
    }
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        let digit = bytes[start].is_ascii_digit();
        let mut end = start + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() == digit {
            end += 1;
        }
        // digit runs are ASCII so `end` always lands on a char boundary
        let part = &s[start..end];
        out.push(if digit { Chunk::Digits(part) } else { Chunk::Text(part) });
        start = end;
    }
    out
}

fn chunked_cmp(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (chunks(a), chunks(b));
    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Chunk::Digits(p), Chunk::Digits(q)) => digits_cmp(p, q),
            (Chunk::Text(p), Chunk::Text(q)) => p.cmp(q),
            _ => x.class().cmp(&y.class()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len())
}

fn digits_cmp(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
