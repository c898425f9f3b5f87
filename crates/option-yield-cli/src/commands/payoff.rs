use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use option_yield_core::payoff::curve::{self, PayoffInput};

use super::pricing::ContractArgs;
use super::PositionArg;
use crate::config::Settings;
use crate::input;

/// Arguments for payoff profiles
#[derive(Args)]
pub struct PayoffArgs {
    #[command(flatten)]
    pub contract: ContractArgs,

    /// Long (bought) or short (written)
    #[arg(long)]
    pub position: Option<PositionArg>,

    /// Premium per share (defaults to the theoretical value)
    #[arg(long)]
    pub premium: Option<Decimal>,

    /// Number of contracts
    #[arg(long)]
    pub contracts: Option<u32>,

    /// Price intervals sampled across 50%..150% of spot
    #[arg(long)]
    pub steps: Option<u32>,

    /// Path to JSON input file (flags override its fields)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_payoff(args: PayoffArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let mut raw = input::read_request(args.input.as_deref())?;
    args.contract.overlay(&mut raw);
    input::set_if_some(&mut raw, "position", args.position);
    input::set_if_some(&mut raw, "premium", args.premium);
    input::set_if_some(&mut raw, "contracts", args.contracts);
    input::set_if_some(&mut raw, "price_steps", args.steps);
    settings.fill_curve_defaults(&mut raw);

    let payoff_input: PayoffInput = serde_json::from_value(raw)?;
    let result = curve::build_payoff_profile(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}
