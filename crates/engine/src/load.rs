//! Text <-> collection conversion. Callers do the file reading and writing.

use crate::error::MatchError;
use crate::model::{Collection, Record, Value};

/// Parse a top-level JSON array of flat objects.
pub fn collection_from_json(text: &str) -> Result<Collection, MatchError> {
    let parsed: serde_json::Value =
        serde_json::from_str(text).map_err(|e| MatchError::Load(format!("invalid JSON: {e}")))?;

    let serde_json::Value::Array(items) = parsed else {
        return Err(MatchError::Load("expected a top-level JSON array of objects".into()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| {
                    let value = scalar_from_json(&k, v)?;
                    Ok((k, value))
                })
                .collect::<Result<Record, MatchError>>(),
            other => Err(MatchError::Load(format!(
                "element {i}: expected an object, found {}",
                json_type_name(&other)
            ))),
        })
        .collect()
}

fn scalar_from_json(field: &str, value: serde_json::Value) -> Result<Value, MatchError> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| {
            MatchError::Load(format!("field '{field}': number {n} out of range"))
        }),
        serde_json::Value::String(s) => Ok(Value::String(s)),
        other => Err(MatchError::UnsupportedValue {
            field: field.to_string(),
            found: json_type_name(&other),
        }),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Parse CSV with a header row. Cells become strings; empty cells are absent.
pub fn collection_from_csv(text: &str) -> Result<Collection, MatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MatchError::Load(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| MatchError::Load(e.to_string()))?;
        let row: Record = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(h, cell)| (h.clone(), Value::String(cell.to_string())))
            .collect();
        rows.push(row);
    }

    if rows.is_empty() {
        log::warn!("CSV input has a header row but no data rows");
    }
    Ok(rows)
}

/// Pretty-printed JSON array.
pub fn collection_to_json(records: &[Record]) -> Result<String, MatchError> {
    serde_json::to_string_pretty(records)
        .map_err(|e| MatchError::Load(format!("JSON serialization error: {e}")))
}
