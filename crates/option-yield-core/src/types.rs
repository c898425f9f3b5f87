use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates and volatilities expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions
pub type Years = Decimal;

/// Shares controlled by one listed equity option contract.
pub const CONTRACT_MULTIPLIER: Decimal = dec!(100);

/// Calendar-day convention for annualising time, theta and yields.
pub const DAYS_PER_YEAR: Decimal = dec!(365);

/// Risk-free rate applied when a caller does not supply one.
pub const DEFAULT_RISK_FREE_RATE: Rate = dec!(0.0525);

/// Default number of price intervals sampled for a payoff curve.
pub const DEFAULT_CURVE_STEPS: u32 = 200;

/// Shortest holding period, in days, that yield annualisation accepts.
pub const MIN_DAYS_TO_EXPIRY: Decimal = dec!(1);

pub(crate) fn default_risk_free_rate() -> Rate {
    DEFAULT_RISK_FREE_RATE
}

/// Option kind. Dispatched once per calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub fn label(self) -> &'static str {
        match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            OptionKind::Call => OptionKind::Put,
            OptionKind::Put => OptionKind::Call,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_kind_serde_lowercase() {
        let json = serde_json::to_string(&OptionKind::Put).unwrap();
        assert_eq!(json, "\"put\"");
        let kind: OptionKind = serde_json::from_str("\"call\"").unwrap();
        assert_eq!(kind, OptionKind::Call);
    }

    #[test]
    fn test_option_kind_opposite() {
        assert_eq!(OptionKind::Call.opposite(), OptionKind::Put);
        assert_eq!(OptionKind::Put.opposite(), OptionKind::Call);
    }

    #[test]
    fn test_with_metadata_envelope() {
        let out = with_metadata("test", &serde_json::json!({"a": 1}), vec![], 7, dec!(1.5));
        assert_eq!(out.methodology, "test");
        assert_eq!(out.metadata.computation_time_us, 7);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.assumptions["a"], 1);
    }
}
