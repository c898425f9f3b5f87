use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Where a request body comes from.
enum RequestSource {
    File(PathBuf),
    Pipe,
    Flags,
}

impl RequestSource {
    fn detect(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(if atty::is(atty::Stream::Stdin) {
                RequestSource::Flags
            } else {
                RequestSource::Pipe
            });
        };
        let mut full = PathBuf::from(path);
        if full.is_relative() {
            full = std::env::current_dir()?.join(full);
        }
        if !full.is_file() {
            return Err(format!("Input file not found: {}", full.display()).into());
        }
        Ok(RequestSource::File(full))
    }

    fn read_text(&self) -> Result<String, Box<dyn std::error::Error>> {
        match self {
            RequestSource::File(path) => fs::read_to_string(path)
                .map_err(|e| format!("Failed to read '{}': {}", path.display(), e).into()),
            RequestSource::Pipe => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
            RequestSource::Flags => Ok(String::new()),
        }
    }
}

/// Raw request object from `--input <file>`, piped stdin, or an empty object
/// when the request is built from flags alone. An empty pipe counts as flags.
pub fn read_request(path: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let source = RequestSource::detect(path)?;
    let text = source.read_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let raw: Value = serde_json::from_str(trimmed).map_err(|e| match &source {
        RequestSource::File(p) => format!("Failed to parse '{}': {}", p.display(), e),
        _ => format!("Failed to parse stdin: {}", e),
    })?;
    if !raw.is_object() {
        return Err("request JSON must be an object".into());
    }
    Ok(raw)
}

/// Flag values override whatever the JSON input carried.
pub fn set_if_some<T: Serialize>(raw: &mut Value, key: &str, value: Option<T>) {
    if let (Some(v), Value::Object(map)) = (value, raw) {
        if let Ok(json) = serde_json::to_value(v) {
            map.insert(key.to_string(), json);
        }
    }
}

/// Defaults only fill gaps.
pub fn set_if_absent<T: Serialize>(raw: &mut Value, key: &str, value: Option<T>) {
    if let (Some(v), Value::Object(map)) = (value, raw) {
        if !map.contains_key(key) {
            if let Ok(json) = serde_json::to_value(v) {
                map.insert(key.to_string(), json);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_input_file() {
        let err = read_request(Some("does-not-exist-request.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_set_if_some_overrides() {
        let mut raw = json!({ "spot_price": "100" });
        set_if_some(&mut raw, "spot_price", Some("105"));
        set_if_some::<&str>(&mut raw, "strike_price", None);
        assert_eq!(raw, json!({ "spot_price": "105" }));
    }

    #[test]
    fn test_set_if_absent_fills_gaps() {
        let mut raw = json!({ "contracts": 2 });
        set_if_absent(&mut raw, "contracts", Some(5));
        set_if_absent(&mut raw, "price_steps", Some(100));
        assert_eq!(raw, json!({ "contracts": 2, "price_steps": 100 }));
    }
}
