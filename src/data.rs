use crate::accessor::Record;
use crate::error::{ChartError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;

/// Wire format of the input records
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    #[serde(rename = "csv")]
    #[default]
    Csv,
    #[serde(rename = "json")]
    Json,
}

pub fn read_records<R: Read>(reader: R, format: InputFormat) -> Result<Vec<Record>> {
    match format {
        InputFormat::Csv => read_csv(reader),
        InputFormat::Json => read_json(reader),
    }
}

/// Read CSV with a header row. Empty cells are left out of the record,
/// numbers and booleans are typed, everything else stays a string.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut record = Record::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if cell.is_empty() {
                continue;
            }
            record.insert(header.clone(), typed_cell(cell));
        }
        records.push(record);
    }

    log::debug!("Read {} CSV records ({} columns)", records.len(), headers.len());
    Ok(records)
}

fn typed_cell(cell: &str) -> Value {
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    if let Some(n) = cell.parse::<f64>().ok().filter(|f| f.is_finite()) {
        return Value::from(n);
    }
    match cell {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

pub fn read_json<R: Read>(reader: R) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_reader(reader)?;
    records_from_json(&value)
}

/// Records from a JSON array of objects. An empty array is valid.
pub fn records_from_json(value: &Value) -> Result<Vec<Record>> {
    let array = value
        .as_array()
        .ok_or_else(|| ChartError::InvalidRecords("input must be a JSON array of objects".into()))?;

    array
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_object().cloned().ok_or_else(|| {
                ChartError::InvalidRecords(format!("item #{} is not an object", idx))
            })
        })
        .collect()
}
