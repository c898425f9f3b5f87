use serde_json::Value;

use super::scalar_text;

/// Key answer per command, in priority order. Dotted paths reach into
/// nested objects.
const PRIORITY_PATHS: [&str; 5] = [
    "price",
    "yield.annualized_yield",
    "breakeven",
    "days",
    "premium",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match key_answer(result_obj) {
        Some(text) => println!("{}", text),
        None => println!("{}", scalar_text(result_obj)),
    }
}

fn key_answer(result: &Value) -> Option<String> {
    if let Some(status) = result.pointer("/yield/status").and_then(Value::as_str) {
        if status == "undefined" {
            return Some("undefined".to_string());
        }
    }

    for path in PRIORITY_PATHS {
        let pointer = format!("/{}", path.replace('.', "/"));
        if let Some(val) = result.pointer(&pointer) {
            if !val.is_null() {
                return Some(scalar_text(val));
            }
        }
    }

    let (key, val) = result.as_object()?.iter().next()?;
    Some(format!("{}: {}", key, scalar_text(val)))
}
