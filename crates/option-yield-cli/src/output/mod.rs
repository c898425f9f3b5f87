pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value for text output.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "n/a".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten nested objects into `parent.child` rows. Arrays of objects are
/// skipped here and rendered separately by the caller. A null profit or loss
/// bound reads as unbounded.
pub(crate) fn flatten_fields(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_fields(&name, val, out);
            }
        }
        Value::Null if prefix.starts_with("max_") => {
            out.push((prefix.to_string(), "unbounded".to_string()))
        }
        Value::Array(arr) if arr.iter().any(Value::is_object) => {}
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(scalar_text).collect();
            out.push((prefix.to_string(), items.join(", ")));
        }
        _ => out.push((prefix.to_string(), scalar_text(value))),
    }
}
