use chrono::Local;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use option_yield_core::pricing::expiry;

/// Arguments for day counting
#[derive(Args)]
pub struct DaysArgs {
    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub expiry: String,

    /// Valuation date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub as_of: Option<String>,
}

pub fn run_days(args: DaysArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let expiry_date = expiry::parse_date("expiry", &args.expiry)?;
    let valuation_date = match args.as_of.as_deref() {
        Some(d) => expiry::parse_date("as_of", d)?,
        None => Local::now().date_naive(),
    };

    let days = Decimal::from(expiry::days_between(valuation_date, expiry_date)?);
    let clamped = expiry::clamp_days(days);
    Ok(json!({
        "result": {
            "days": days.to_string(),
            "clamped_days": clamped.to_string(),
            "time_to_expiry": expiry::year_fraction(days)?.to_string(),
            "valuation_date": valuation_date.to_string(),
            "expiry_date": expiry_date.to_string(),
        }
    }))
}
