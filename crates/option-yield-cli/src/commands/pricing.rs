use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use option_yield_core::pricing::valuation::{self, OptionInput};

use super::KindArg;
use crate::config::Settings;
use crate::input;

/// Contract terms shared by the price and payoff commands
#[derive(Args, Debug, Clone)]
pub struct ContractArgs {
    /// Underlying spot price
    #[arg(long)]
    pub spot: Option<Decimal>,

    /// Strike price
    #[arg(long)]
    pub strike: Option<Decimal>,

    /// Time to expiry in years (e.g. 0.25)
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Time to expiry in calendar days (used when --years is absent)
    #[arg(long)]
    pub days: Option<Decimal>,

    /// Risk-free rate (e.g. 0.05 for 5%)
    #[arg(long, allow_negative_numbers = true)]
    pub rate: Option<Decimal>,

    /// Volatility (e.g. 0.25 for 25%)
    #[arg(long, alias = "vol")]
    pub volatility: Option<Decimal>,

    /// Continuous dividend yield
    #[arg(long)]
    pub dividend_yield: Option<Decimal>,

    /// Option kind
    #[arg(long)]
    pub kind: Option<KindArg>,
}

impl ContractArgs {
    pub fn overlay(&self, raw: &mut Value) {
        input::set_if_some(raw, "spot_price", self.spot);
        input::set_if_some(raw, "strike_price", self.strike);
        input::set_if_some(raw, "time_to_expiry", self.years);
        input::set_if_some(raw, "days_to_expiry", self.days);
        input::set_if_some(raw, "risk_free_rate", self.rate);
        input::set_if_some(raw, "volatility", self.volatility);
        input::set_if_some(raw, "dividend_yield", self.dividend_yield);
        input::set_if_some(raw, "option_kind", self.kind);
    }
}

/// Arguments for option pricing
#[derive(Args)]
pub struct PriceArgs {
    #[command(flatten)]
    pub contract: ContractArgs,

    /// Path to JSON input file (flags override its fields)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_price(args: PriceArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let mut raw = input::read_request(args.input.as_deref())?;
    args.contract.overlay(&mut raw);
    settings.fill_market_defaults(&mut raw);

    let opt_input: OptionInput = serde_json::from_value(raw)?;
    let result = valuation::price_option(&opt_input)?;
    Ok(serde_json::to_value(result)?)
}
