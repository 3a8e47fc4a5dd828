//! Flattening JSON API records into a table.
//!
//! Nested objects become dotted column names (`"family.name"`), arrays of
//! scalars are joined with `;`, and anything more deeply structured is
//! kept as compact JSON text.

use drug_nme_approval_models::{NormalizedTable, Row};
use serde_json::{Map, Value};

/// Column used for records that are not JSON objects.
const VALUE_COLUMN: &str = "value";

/// Flattens `records` into a table whose columns appear in first-seen
/// order. Fields a record lacks are left empty.
#[must_use]
pub fn records_to_table(records: &[Value]) -> NormalizedTable {
    let mut header: Vec<String> = Vec::new();
    let mut flat_records = Vec::with_capacity(records.len());

    for record in records {
        let mut fields = Vec::new();
        match record {
            Value::Object(map) => flatten_object("", map, &mut fields),
            other => fields.push((VALUE_COLUMN.to_owned(), cell_text(other))),
        }
        for (key, _) in &fields {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
        flat_records.push(fields);
    }

    let rows: Vec<Row> = flat_records
        .into_iter()
        .map(|fields| {
            let mut row = vec![String::new(); header.len()];
            for (key, value) in fields {
                if let Some(col) = header.iter().position(|h| *h == key) {
                    row[col] = value;
                }
            }
            row
        })
        .collect();

    NormalizedTable::new(header, rows)
}

fn flatten_object(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_object(&name, inner, out),
            other => out.push((name, cell_text(other))),
        }
    }
}

/// Text of a single cell.
#[must_use]
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) if items.iter().all(|v| !v.is_array() && !v.is_object()) => items
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>()
            .join(";"),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
