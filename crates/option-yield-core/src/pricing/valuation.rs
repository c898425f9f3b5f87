use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::black_scholes::{
    breakeven, intrinsic_value, BlackScholes, ContractTerms, GreeksResult, OptionPricer,
};
use super::expiry;
use crate::error::OptionYieldError;
use crate::math;
use crate::types::*;
use crate::OptionYieldResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Pricing request. Time may be given in years or in calendar days;
/// `time_to_expiry` wins when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionInput {
    pub spot_price: Money,
    pub strike_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_expiry: Option<Years>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_to_expiry: Option<Decimal>,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: Rate,
    pub volatility: Rate,
    #[serde(default)]
    pub dividend_yield: Rate,
    pub option_kind: OptionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Moneyness {
    Itm,
    Atm,
    Otm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionOutput {
    pub price: Money,
    pub intrinsic_value: Money,
    pub time_value: Money,
    pub greeks: GreeksResult,
    pub probability_itm: Rate,
    pub breakeven: Money,
    pub moneyness: Moneyness,
    /// Price of the opposite kind implied by put-call parity.
    pub put_call_parity_price: Money,
    pub expired: bool,
}

impl OptionInput {
    pub fn terms(&self) -> OptionYieldResult<ContractTerms> {
        let time_to_expiry = match (self.time_to_expiry, self.days_to_expiry) {
            (Some(t), _) => t,
            (None, Some(days)) => expiry::year_fraction(days)?,
            (None, None) => {
                return Err(OptionYieldError::invalid(
                    "time_to_expiry",
                    "time_to_expiry or days_to_expiry is required",
                ))
            }
        };
        ContractTerms::new(
            self.option_kind,
            self.spot_price,
            self.strike_price,
            time_to_expiry,
            self.risk_free_rate,
            self.volatility,
            self.dividend_yield,
        )
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// ATM band: spot within 1% of strike.
pub fn classify_moneyness(kind: OptionKind, spot: Money, strike: Money) -> Moneyness {
    // A ratio too large for Decimal is far above the strike.
    let ratio = spot.checked_div(strike).unwrap_or(Decimal::MAX);
    let atm_lo = dec!(0.99);
    let atm_hi = dec!(1.01);
    if ratio >= atm_lo && ratio <= atm_hi {
        return Moneyness::Atm;
    }
    let above = ratio > atm_hi;
    match (kind, above) {
        (OptionKind::Call, true) | (OptionKind::Put, false) => Moneyness::Itm,
        _ => Moneyness::Otm,
    }
}

/// C - P = S e^(-qT) - K e^(-rT), solved for the opposite kind.
fn parity_counterpart(terms: &ContractTerms, price: Money) -> OptionYieldResult<Money> {
    let t = terms.time_to_expiry;
    let spot_leg = terms
        .spot_price
        .checked_mul(math::exp(-terms.dividend_yield * t))
        .ok_or_else(|| OptionYieldError::out_of_range("dividend_yield"))?;
    let strike_leg = terms
        .strike_price
        .checked_mul(math::exp(-terms.risk_free_rate * t))
        .ok_or_else(|| OptionYieldError::out_of_range("risk_free_rate"))?;
    let counterpart = match terms.option_kind {
        OptionKind::Call => price.checked_sub(spot_leg).and_then(|v| v.checked_add(strike_leg)),
        OptionKind::Put => price.checked_add(spot_leg).and_then(|v| v.checked_sub(strike_leg)),
    };
    counterpart.ok_or_else(|| OptionYieldError::out_of_range("spot_price"))
}

// ---------------------------------------------------------------------------
// Public API: price_option
// ---------------------------------------------------------------------------

pub fn price_option(input: &OptionInput) -> OptionYieldResult<ComputationOutput<OptionOutput>> {
    let start = Instant::now();
    let terms = input.terms()?;
    let pricer = BlackScholes;

    let greeks = pricer.calculate_all(&terms)?;
    let probability_itm = pricer.probability_itm(&terms)?;

    let s = terms.spot_price;
    let k = terms.strike_price;
    let iv = intrinsic_value(terms.option_kind, s, k);
    let expired = terms.is_expired();

    tracing::debug!(
        kind = terms.option_kind.label(),
        spot = %s,
        strike = %k,
        years = %terms.time_to_expiry,
        expired,
        "priced option"
    );

    let mut warnings = Vec::new();
    if expired {
        warnings.push("Contract is at expiration; value reduces to intrinsic value".to_string());
    }
    if !expired && greeks.price.is_zero() {
        warnings.push("Theoretical value rounds to zero; contract is deep out of the money".to_string());
    }

    let output = OptionOutput {
        price: greeks.price,
        intrinsic_value: iv,
        time_value: greeks.price - iv,
        greeks,
        probability_itm,
        breakeven: breakeven(terms.option_kind, k, greeks.price),
        moneyness: classify_moneyness(terms.option_kind, s, k),
        put_call_parity_price: parity_counterpart(&terms, greeks.price)?,
        expired,
    };

    let methodology = if expired {
        "Intrinsic value at expiration"
    } else {
        "Black-Scholes-Merton (closed-form)"
    };

    let assumptions = serde_json::json!({
        "model": pricer.name(),
        "option_kind": terms.option_kind.label(),
        "time_to_expiry_years": terms.time_to_expiry.to_string(),
        "risk_free_rate": terms.risk_free_rate.to_string(),
        "volatility": terms.volatility.to_string(),
        "dividend_yield": terms.dividend_yield.to_string(),
        "theta_convention": "per calendar day (annual / 365)",
        "vega_rho_convention": "per 1 percentage point",
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() < tol
    }

    fn one_year_call() -> OptionInput {
        OptionInput {
            spot_price: dec!(100),
            strike_price: dec!(100),
            time_to_expiry: Some(dec!(1)),
            days_to_expiry: None,
            risk_free_rate: dec!(0.05),
            volatility: dec!(0.20),
            dividend_yield: dec!(0),
            option_kind: OptionKind::Call,
        }
    }

    #[test]
    fn test_one_year_atm_call() {
        let result = price_option(&one_year_call()).unwrap();
        let out = &result.result;
        assert!(approx_eq(out.price, dec!(10.4505835722), dec!(0.0001)));
        assert_eq!(out.intrinsic_value, Decimal::ZERO);
        assert_eq!(out.time_value, out.price);
        assert_eq!(out.moneyness, Moneyness::Atm);
        assert!(approx_eq(out.probability_itm, dec!(0.5596176924), dec!(0.0001)));
        assert_eq!(out.breakeven, dec!(100) + out.price);
        assert!(!out.expired);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_parity_counterpart_matches_put_price() {
        let call = price_option(&one_year_call()).unwrap().result;
        let put_input = OptionInput {
            option_kind: OptionKind::Put,
            ..one_year_call()
        };
        let put = price_option(&put_input).unwrap().result;
        assert!(approx_eq(call.put_call_parity_price, put.price, dec!(0.000001)));
        assert!(approx_eq(put.put_call_parity_price, call.price, dec!(0.000001)));
    }

    #[test]
    fn test_days_to_expiry_input() {
        let input = OptionInput {
            time_to_expiry: None,
            days_to_expiry: Some(dec!(30)),
            ..one_year_call()
        };
        let out = price_option(&input).unwrap().result;
        assert!(approx_eq(out.price, dec!(2.4933768194), dec!(0.0001)));
    }

    #[test]
    fn test_missing_time_rejected() {
        let input = OptionInput {
            time_to_expiry: None,
            days_to_expiry: None,
            ..one_year_call()
        };
        match price_option(&input).unwrap_err() {
            OptionYieldError::InvalidInput { field, .. } => assert_eq!(field, "time_to_expiry"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_expired_contract_report() {
        let input = OptionInput {
            spot_price: dec!(108),
            time_to_expiry: Some(Decimal::ZERO),
            ..one_year_call()
        };
        let result = price_option(&input).unwrap();
        assert_eq!(result.result.price, dec!(8));
        assert_eq!(result.result.time_value, Decimal::ZERO);
        assert!(result.result.expired);
        assert_eq!(result.result.moneyness, Moneyness::Itm);
        assert_eq!(result.result.put_call_parity_price, Decimal::ZERO);
        assert_eq!(result.methodology, "Intrinsic value at expiration");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_moneyness_classification() {
        assert_eq!(classify_moneyness(OptionKind::Call, dec!(110), dec!(100)), Moneyness::Itm);
        assert_eq!(classify_moneyness(OptionKind::Call, dec!(90), dec!(100)), Moneyness::Otm);
        assert_eq!(classify_moneyness(OptionKind::Put, dec!(90), dec!(100)), Moneyness::Itm);
        assert_eq!(classify_moneyness(OptionKind::Put, dec!(110), dec!(100)), Moneyness::Otm);
        assert_eq!(classify_moneyness(OptionKind::Put, dec!(100.5), dec!(100)), Moneyness::Atm);
        let huge = dec!(1000000000000000000000000000);
        let tiny = dec!(0.0000000000001);
        assert_eq!(classify_moneyness(OptionKind::Call, huge, tiny), Moneyness::Itm);
        assert_eq!(classify_moneyness(OptionKind::Put, huge, tiny), Moneyness::Otm);
    }

    #[test]
    fn test_out_of_range_volatility_is_an_error() {
        let input = OptionInput {
            volatility: dec!(1000000000000000),
            ..one_year_call()
        };
        assert!(matches!(
            price_option(&input),
            Err(OptionYieldError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_moneyness_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Moneyness::Otm).unwrap(), "\"OTM\"");
    }

    #[test]
    fn test_metadata_populated() {
        let result = price_option(&one_year_call()).unwrap();
        assert!(!result.methodology.is_empty());
        assert!(!result.metadata.version.is_empty());
        assert_eq!(result.metadata.precision, "rust_decimal_128bit");
        assert_eq!(result.assumptions["model"], "Black-Scholes-Merton");
    }
}
