use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::fs;

use crate::input;
use crate::OutputFormat;

/// Defaults read from a YAML settings file. Anything set here is used only
/// when neither a flag nor the JSON input supplies the field.
///
/// ```yaml
/// risk_free_rate: 0.043
/// dividend_yield: 0.0
/// curve_steps: 400
/// output: table
/// log_level: info
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub risk_free_rate: Option<Decimal>,
    pub dividend_yield: Option<Decimal>,
    pub curve_steps: Option<u32>,
    pub output: Option<OutputFormat>,
    pub log_level: Option<String>,
}

impl Settings {
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings '{}': {}", path, e))?;
        let settings: Settings = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse settings '{}': {}", path, e))?;
        Ok(settings)
    }

    /// Fill market defaults into a raw request object.
    pub fn fill_market_defaults(&self, raw: &mut Value) {
        input::set_if_absent(raw, "risk_free_rate", self.risk_free_rate);
        input::set_if_absent(raw, "dividend_yield", self.dividend_yield);
    }

    pub fn fill_curve_defaults(&self, raw: &mut Value) {
        self.fill_market_defaults(raw);
        input::set_if_absent(raw, "price_steps", self.curve_steps);
    }
}
