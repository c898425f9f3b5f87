use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::flatten_fields;
use super::scalar_text;

/// Rows kept per curve when rendering a table; the full curve is in JSON/CSV.
const MAX_CURVE_ROWS: usize = 21;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result_table(result, map),
            None => print_field_table(value),
        },
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    print_field_table(result);

    if let Value::Object(res_map) = result {
        for (key, val) in res_map {
            if let Value::Array(arr) = val {
                if arr.iter().any(Value::is_object) {
                    println!("\n{}:", key);
                    print_sample_table(arr);
                }
            }
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(value: &Value) {
    let mut rows = Vec::new();
    flatten_fields("", value, &mut rows);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in rows {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));
}

/// Long curves are thinned to an evenly spaced subset that keeps both ends.
fn print_sample_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());

    let stride = if arr.len() > MAX_CURVE_ROWS {
        (arr.len() - 1).div_ceil(MAX_CURVE_ROWS - 1)
    } else {
        1
    };
    let last = arr.len() - 1;
    for (i, item) in arr.iter().enumerate() {
        if i % stride != 0 && i != last {
            continue;
        }
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(scalar_text).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
