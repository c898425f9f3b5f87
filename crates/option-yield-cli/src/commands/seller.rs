use chrono::Local;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use option_yield_core::pricing::expiry;
use option_yield_core::yield_analysis::seller::{self, YieldInput};

use super::KindArg;
use crate::config::Settings;
use crate::input;

/// Arguments for seller yield analysis
#[derive(Args)]
pub struct YieldArgs {
    /// Underlying spot price
    #[arg(long)]
    pub spot: Option<Decimal>,

    /// Strike price
    #[arg(long)]
    pub strike: Option<Decimal>,

    /// Calendar days to expiry
    #[arg(long)]
    pub days: Option<Decimal>,

    /// Expiry date (YYYY-MM-DD); counts days from --as-of
    #[arg(long, conflicts_with = "days")]
    pub expiry: Option<String>,

    /// Valuation date for --expiry (YYYY-MM-DD, defaults to today)
    #[arg(long, requires = "expiry")]
    pub as_of: Option<String>,

    /// Option kind: call = covered call, put = cash-secured put
    #[arg(long)]
    pub kind: Option<KindArg>,

    /// Premium received per share
    #[arg(long)]
    pub premium: Option<Decimal>,

    /// Bid quote (with --ask, the midpoint is used as premium)
    #[arg(long)]
    pub bid: Option<Decimal>,

    /// Ask quote
    #[arg(long)]
    pub ask: Option<Decimal>,

    /// Volatility for a theoretical premium when no quote is given
    #[arg(long, alias = "vol")]
    pub volatility: Option<Decimal>,

    /// Risk-free rate for a theoretical premium
    #[arg(long, allow_negative_numbers = true)]
    pub rate: Option<Decimal>,

    /// Continuous dividend yield for a theoretical premium
    #[arg(long)]
    pub dividend_yield: Option<Decimal>,

    /// Path to JSON input file (flags override its fields)
    #[arg(long)]
    pub input: Option<String>,
}

fn days_from_expiry(expiry_date: &str, as_of: Option<&str>) -> Result<i64, Box<dyn std::error::Error>> {
    let expiry_date = expiry::parse_date("expiry", expiry_date)?;
    let valuation_date = match as_of {
        Some(d) => expiry::parse_date("as_of", d)?,
        None => Local::now().date_naive(),
    };
    Ok(expiry::days_between(valuation_date, expiry_date)?)
}

pub fn run_yield(args: YieldArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let mut raw = input::read_request(args.input.as_deref())?;

    let days = match args.expiry.as_deref() {
        Some(e) => Some(Decimal::from(days_from_expiry(e, args.as_of.as_deref())?)),
        None => args.days,
    };

    input::set_if_some(&mut raw, "spot_price", args.spot);
    input::set_if_some(&mut raw, "strike_price", args.strike);
    input::set_if_some(&mut raw, "days_to_expiry", days);
    input::set_if_some(&mut raw, "option_kind", args.kind);
    input::set_if_some(&mut raw, "premium", args.premium);
    input::set_if_some(&mut raw, "bid", args.bid);
    input::set_if_some(&mut raw, "ask", args.ask);
    input::set_if_some(&mut raw, "volatility", args.volatility);
    input::set_if_some(&mut raw, "risk_free_rate", args.rate);
    input::set_if_some(&mut raw, "dividend_yield", args.dividend_yield);
    settings.fill_market_defaults(&mut raw);

    let yield_input: YieldInput = serde_json::from_value(raw)?;
    let result = seller::analyze_seller_yield(&yield_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_from_expiry_with_as_of() {
        assert_eq!(days_from_expiry("2024-07-19", Some("2024-06-19")).unwrap(), 30);
    }

    #[test]
    fn test_days_from_expiry_rejects_bad_date() {
        assert!(days_from_expiry("07/19/2024", Some("2024-06-19")).is_err());
    }
}
