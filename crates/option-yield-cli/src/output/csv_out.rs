use serde_json::{Map, Value};
use std::io;

use super::flatten_fields;
use super::scalar_text;

/// Write output as CSV to stdout. Payoff profiles are written as one row per
/// sampled price; everything else as `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) if map.contains_key("at_expiration") => {
            for row in curve_rows(map) {
                let _ = wtr.write_record(&row);
            }
        }
        _ => {
            let mut rows = Vec::new();
            flatten_fields("", result, &mut rows);
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in rows {
                let _ = wtr.write_record([key, val]);
            }
        }
    }

    let _ = wtr.flush();
}

/// Header plus `underlying_price, expiration_pl, valuation_pl` per sample.
/// The valuation column is empty when the contract has no time left.
fn curve_rows(result: &Map<String, Value>) -> Vec<Vec<String>> {
    let expiration = samples(result.get("at_expiration"));
    let valuation = samples(result.get("at_valuation"));

    let mut rows = vec![vec![
        "underlying_price".to_string(),
        "expiration_pl".to_string(),
        "valuation_pl".to_string(),
    ]];
    for (i, (price, pl)) in expiration.iter().enumerate() {
        let valuation_pl = valuation
            .get(i)
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        rows.push(vec![price.clone(), pl.clone(), valuation_pl]);
    }
    rows
}

fn samples(value: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Array(arr)) = value else {
        return Vec::new();
    };
    arr.iter()
        .filter_map(|s| {
            let price = s.get("underlying_price")?;
            let pl = s.get("profit_loss")?;
            Some((scalar_text(price), scalar_text(pl)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_curve_rows_join_both_curves() {
        let v = json!({
            "at_expiration": [
                {"underlying_price": "90", "profit_loss": "-800"},
                {"underlying_price": "100", "profit_loss": "200"}
            ],
            "at_valuation": [
                {"underlying_price": "90", "profit_loss": "-550"},
                {"underlying_price": "100", "profit_loss": "10"}
            ]
        });
        let rows = curve_rows(v.as_object().unwrap());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["90", "-800", "-550"]);
        assert_eq!(rows[2], vec!["100", "200", "10"]);
    }

    #[test]
    fn test_curve_rows_without_valuation_curve() {
        let v = json!({
            "at_expiration": [{"underlying_price": "90", "profit_loss": "-800"}],
            "at_valuation": null
        });
        let rows = curve_rows(v.as_object().unwrap());
        assert_eq!(rows[1], vec!["90", "-800", ""]);
    }
}
