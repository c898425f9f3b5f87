pub mod expiry;
pub mod payoff;
pub mod pricing;
pub mod seller;

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KindArg {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionArg {
    Long,
    Short,
}
