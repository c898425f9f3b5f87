use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::OptionYieldError;
use crate::pricing::black_scholes::{
    breakeven, intrinsic_value, BlackScholes, ContractTerms, OptionPricer,
};
use crate::pricing::valuation::OptionInput;
use crate::types::*;
use crate::OptionYieldResult;

/// Lowest underlying price sampled on any curve.
const MIN_SAMPLE_PRICE: Money = dec!(0.01);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Long,
    Short,
}

impl Position {
    pub fn sign(self) -> Decimal {
        match self {
            Position::Long => Decimal::ONE,
            Position::Short => -Decimal::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffSample {
    pub underlying_price: Money,
    pub profit_loss: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffCurve {
    pub option_kind: OptionKind,
    pub position: Position,
    pub contracts: u32,
    pub premium: Money,
    pub at_expiration: Vec<PayoffSample>,
    /// Present only while the contract has time left.
    pub at_valuation: Option<Vec<PayoffSample>>,
    pub breakeven: Money,
    /// Zero crossings of the sampled expiration curve.
    pub sampled_breakevens: Vec<Money>,
    /// `None` means unbounded.
    pub max_profit: Option<Money>,
    /// `None` means unbounded.
    pub max_loss: Option<Money>,
    pub risk_reward_ratio: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn position_scale(position: Position, contracts: u32) -> Decimal {
    position.sign() * CONTRACT_MULTIPLIER * Decimal::from(contracts)
}

/// Sampled prices over [max(0.01, S/2), 1.5 S], `steps + 1` points. When
/// 1.5 S falls below the floor the range collapses onto the floor.
fn sample_prices(spot: Money, steps: u32) -> OptionYieldResult<Vec<Money>> {
    let low = (spot * dec!(0.5)).max(MIN_SAMPLE_PRICE);
    let high = spot
        .checked_mul(dec!(1.5))
        .ok_or_else(|| OptionYieldError::out_of_range("spot_price"))?
        .max(low);
    let step_size = (high - low) / Decimal::from(steps);
    Ok((0..=steps)
        .map(|i| low + step_size * Decimal::from(i))
        .collect())
}

/// (value - premium) scaled to the position.
fn scaled_pl(value: Money, premium: Money, scale: Decimal) -> OptionYieldResult<Money> {
    value
        .checked_sub(premium)
        .and_then(|v| v.checked_mul(scale))
        .ok_or_else(|| OptionYieldError::out_of_range("contracts"))
}

/// Max profit / max loss by kind and stance, scaled to the position size.
fn profit_loss_bounds(
    kind: OptionKind,
    position: Position,
    strike: Money,
    premium: Money,
    contracts: u32,
) -> OptionYieldResult<(Option<Money>, Option<Money>)> {
    let size = CONTRACT_MULTIPLIER * Decimal::from(contracts);
    let premium_total = premium
        .checked_mul(size)
        .ok_or_else(|| OptionYieldError::out_of_range("premium"))?;
    let put_floor = (strike - premium)
        .checked_mul(size)
        .ok_or_else(|| OptionYieldError::out_of_range("strike_price"))?;
    Ok(match (kind, position) {
        (OptionKind::Call, Position::Long) => (None, Some(premium_total)),
        (OptionKind::Call, Position::Short) => (Some(premium_total), None),
        (OptionKind::Put, Position::Long) => (Some(put_floor), Some(premium_total)),
        (OptionKind::Put, Position::Short) => (Some(premium_total), Some(put_floor)),
    })
}

/// Zero crossings of a sampled curve by linear interpolation between sign
/// changes. A run of exact zeros contributes only its first point.
pub fn find_breakevens(samples: &[PayoffSample]) -> Vec<Money> {
    let mut breakevens = Vec::new();

    for i in 0..samples.len() {
        let curr = &samples[i];
        if curr.profit_loss.is_zero() {
            let continues_run = i > 0 && samples[i - 1].profit_loss.is_zero();
            if !continues_run {
                breakevens.push(curr.underlying_price);
            }
            continue;
        }
        if i == 0 {
            continue;
        }

        let prev = &samples[i - 1];
        if prev.profit_loss.is_zero() {
            continue;
        }
        let prev_positive = prev.profit_loss > Decimal::ZERO;
        let curr_positive = curr.profit_loss > Decimal::ZERO;
        if prev_positive != curr_positive {
            let denom = curr.profit_loss - prev.profit_loss;
            let t = -prev.profit_loss / denom;
            breakevens.push(
                prev.underlying_price + t * (curr.underlying_price - prev.underlying_price),
            );
        }
    }

    breakevens
}

fn validate_curve_request(premium: Money, contracts: u32, steps: u32) -> OptionYieldResult<()> {
    if premium < Decimal::ZERO {
        return Err(OptionYieldError::invalid("premium", "must not be negative"));
    }
    if contracts == 0 {
        return Err(OptionYieldError::invalid("contracts", "must be at least 1"));
    }
    if steps < 2 {
        return Err(OptionYieldError::invalid("price_steps", "must be at least 2"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Curve generation
// ---------------------------------------------------------------------------

/// Payoff curve at the default resolution, valued with Black-Scholes.
pub fn generate_curve(
    terms: &ContractTerms,
    premium: Money,
    contracts: u32,
    position: Position,
) -> OptionYieldResult<PayoffCurve> {
    generate_curve_with(&BlackScholes, terms, premium, contracts, position, DEFAULT_CURVE_STEPS)
}

/// Payoff curve with an explicit pricer for the valuation-date trace.
pub fn generate_curve_with<P: OptionPricer>(
    pricer: &P,
    terms: &ContractTerms,
    premium: Money,
    contracts: u32,
    position: Position,
    steps: u32,
) -> OptionYieldResult<PayoffCurve> {
    terms.validate()?;
    validate_curve_request(premium, contracts, steps)?;

    let kind = terms.option_kind;
    let strike = terms.strike_price;
    let scale = position_scale(position, contracts);
    let prices = sample_prices(terms.spot_price, steps)?;

    let at_expiration = prices
        .iter()
        .map(|&s| {
            Ok(PayoffSample {
                underlying_price: s,
                profit_loss: scaled_pl(intrinsic_value(kind, s, strike), premium, scale)?,
            })
        })
        .collect::<OptionYieldResult<Vec<_>>>()?;

    let at_valuation = if terms.is_expired() {
        None
    } else {
        let samples = prices
            .iter()
            .map(|&s| {
                let value = pricer.price(&terms.with_spot(s))?;
                Ok(PayoffSample {
                    underlying_price: s,
                    profit_loss: scaled_pl(value, premium, scale)?,
                })
            })
            .collect::<OptionYieldResult<Vec<_>>>()?;
        Some(samples)
    };

    let (max_profit, max_loss) = profit_loss_bounds(kind, position, strike, premium, contracts)?;
    let risk_reward_ratio = match (max_profit, max_loss) {
        (Some(mp), Some(ml)) if ml > Decimal::ZERO => mp.checked_div(ml),
        _ => None,
    };

    Ok(PayoffCurve {
        option_kind: kind,
        position,
        contracts,
        premium,
        sampled_breakevens: find_breakevens(&at_expiration),
        at_expiration,
        at_valuation,
        breakeven: breakeven(kind, strike, premium),
        max_profit,
        max_loss,
        risk_reward_ratio,
    })
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

fn default_contracts() -> u32 {
    1
}

fn default_steps() -> u32 {
    DEFAULT_CURVE_STEPS
}

/// Payoff request. Without a `premium` the position is opened at the
/// theoretical value of the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffInput {
    #[serde(flatten)]
    pub option: OptionInput,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<Money>,
    #[serde(default = "default_contracts")]
    pub contracts: u32,
    #[serde(default = "default_steps")]
    pub price_steps: u32,
}

pub fn build_payoff_profile(
    input: &PayoffInput,
) -> OptionYieldResult<ComputationOutput<PayoffCurve>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = input.option.terms()?;
    let pricer = BlackScholes;
    let premium = match input.premium {
        Some(p) => p,
        None => pricer.price(&terms)?,
    };

    let curve = generate_curve_with(
        &pricer,
        &terms,
        premium,
        input.contracts,
        input.position,
        input.price_steps,
    )?;

    if terms.is_expired() {
        tracing::warn!("contract is at expiration; only the expiration curve is produced");
        warnings.push("Contract is at expiration; no valuation-date curve".to_string());
    }
    if curve.max_profit.is_none() {
        warnings.push("Profit potential is theoretically unlimited".to_string());
    }
    if curve.max_loss.is_none() {
        warnings.push("Loss potential is theoretically unlimited".to_string());
    }

    tracing::debug!(
        kind = terms.option_kind.label(),
        position = ?input.position,
        contracts = input.contracts,
        samples = curve.at_expiration.len(),
        "built payoff profile"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Single-option payoff profile — expiration and valuation-date P/L",
        &serde_json::json!({
            "option_kind": terms.option_kind.label(),
            "position": input.position,
            "premium": premium.to_string(),
            "premium_source": if input.premium.is_some() { "quoted" } else { "theoretical" },
            "contract_multiplier": CONTRACT_MULTIPLIER.to_string(),
            "price_steps": input.price_steps,
        }),
        warnings,
        elapsed,
        curve,
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

    fn put_terms() -> ContractTerms {
        ContractTerms {
            spot_price: dec!(100),
            strike_price: dec!(100),
            time_to_expiry: dec!(30) / dec!(365),
            risk_free_rate: dec!(0.05),
            volatility: dec!(0.20),
            dividend_yield: dec!(0),
            option_kind: OptionKind::Put,
        }
    }

    #[test]
    fn test_short_put_example() {
        let curve = generate_curve(&put_terms(), dec!(2.49), 1, Position::Short).unwrap();
        assert_eq!(curve.max_profit, Some(dec!(249)));
        assert_eq!(curve.max_loss, Some(dec!(9751)));
        assert_eq!(curve.breakeven, dec!(97.51));
        assert_eq!(curve.at_expiration.len(), DEFAULT_CURVE_STEPS as usize + 1);
        assert!(curve.at_valuation.is_some());
    }

    #[test]
    fn test_bounds_by_kind_and_position() {
        let call = put_terms().with_kind(OptionKind::Call);
        let long_call = generate_curve(&call, dec!(3), 2, Position::Long).unwrap();
        assert_eq!(long_call.max_profit, None);
        assert_eq!(long_call.max_loss, Some(dec!(600)));
        assert_eq!(long_call.risk_reward_ratio, None);

        let short_call = generate_curve(&call, dec!(3), 2, Position::Short).unwrap();
        assert_eq!(short_call.max_profit, Some(dec!(600)));
        assert_eq!(short_call.max_loss, None);

        let long_put = generate_curve(&put_terms(), dec!(4), 1, Position::Long).unwrap();
        assert_eq!(long_put.max_profit, Some(dec!(9600)));
        assert_eq!(long_put.max_loss, Some(dec!(400)));
        assert_eq!(long_put.risk_reward_ratio, Some(dec!(24)));
    }

    #[test]
    fn test_sample_range() {
        let curve = generate_curve(&put_terms(), dec!(2), 1, Position::Long).unwrap();
        assert_eq!(curve.at_expiration.first().unwrap().underlying_price, dec!(50));
        assert_eq!(curve.at_expiration.last().unwrap().underlying_price, dec!(150));
        let prices: Vec<_> = curve.at_expiration.iter().map(|p| p.underlying_price).collect();
        assert!(prices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_sample_range_floor() {
        let terms = ContractTerms {
            spot_price: dec!(0.015),
            strike_price: dec!(0.02),
            ..put_terms()
        };
        let curve = generate_curve(&terms, dec!(0.001), 1, Position::Long).unwrap();
        assert_eq!(curve.at_expiration[0].underlying_price, dec!(0.01));
    }

    #[test]
    fn test_sample_range_collapses_below_floor() {
        let terms = ContractTerms {
            spot_price: dec!(0.004),
            strike_price: dec!(0.005),
            ..put_terms()
        };
        let curve = generate_curve_with(&BlackScholes, &terms, dec!(0.001), 1, Position::Long, 10)
            .unwrap();
        let prices: Vec<_> = curve.at_expiration.iter().map(|p| p.underlying_price).collect();
        assert_eq!(prices.len(), 11);
        assert!(prices.windows(2).all(|w| w[0] <= w[1]));
        assert!(prices.iter().all(|&p| p == dec!(0.01)));
    }

    #[test]
    fn test_oversized_position_is_rejected_not_panicking() {
        let terms = ContractTerms {
            spot_price: dec!(10000000000000000000000000),
            strike_price: dec!(10000000000000000000000000),
            time_to_expiry: Decimal::ZERO,
            ..put_terms()
        };
        let err = generate_curve(&terms, dec!(1), u32::MAX, Position::Long).unwrap_err();
        assert!(matches!(err, OptionYieldError::InvalidInput { .. }));
    }

    #[test]
    fn test_expiration_profit_loss_values() {
        let call = put_terms().with_kind(OptionKind::Call);
        let curve = generate_curve_with(&BlackScholes, &call, dec!(5), 3, Position::Long, 100).unwrap();
        // 50..150 in steps of 1: index 70 is S=120
        let at_120 = curve.at_expiration[70];
        assert_eq!(at_120.underlying_price, dec!(120));
        assert_eq!(at_120.profit_loss, dec!(4500));
        // below strike the long call loses the premium
        assert_eq!(curve.at_expiration[0].profit_loss, dec!(-1500));
    }

    #[test]
    fn test_short_is_mirror_of_long() {
        let long = generate_curve(&put_terms(), dec!(2.49), 2, Position::Long).unwrap();
        let short = generate_curve(&put_terms(), dec!(2.49), 2, Position::Short).unwrap();
        for (l, s) in long.at_expiration.iter().zip(short.at_expiration.iter()) {
            assert_eq!(l.profit_loss, -s.profit_loss);
        }
        let lv = long.at_valuation.unwrap();
        let sv = short.at_valuation.unwrap();
        for (l, s) in lv.iter().zip(sv.iter()) {
            assert_eq!(l.profit_loss, -s.profit_loss);
        }
    }

    #[test]
    fn test_valuation_curve_carries_time_value() {
        let curve = generate_curve(&put_terms(), dec!(2.49), 1, Position::Long).unwrap();
        let valuation = curve.at_valuation.unwrap();
        let mid = DEFAULT_CURVE_STEPS as usize / 2;
        assert_eq!(valuation[mid].underlying_price, dec!(100));
        // ATM: time value keeps the long position above its expiration P/L
        assert!(valuation[mid].profit_loss > curve.at_expiration[mid].profit_loss);
    }

    #[test]
    fn test_sampled_breakeven_matches_analytic() {
        let curve = generate_curve(&put_terms(), dec!(2.49), 1, Position::Short).unwrap();
        assert_eq!(curve.sampled_breakevens.len(), 1);
        assert!(approx_eq(curve.sampled_breakevens[0], dec!(97.51), dec!(0.000001)));
    }

    #[test]
    fn test_expired_contract_has_no_valuation_curve() {
        let terms = ContractTerms {
            time_to_expiry: Decimal::ZERO,
            ..put_terms()
        };
        let curve = generate_curve(&terms, dec!(1), 1, Position::Long).unwrap();
        assert!(curve.at_valuation.is_none());
    }

    #[test]
    fn test_invalid_requests() {
        assert!(generate_curve(&put_terms(), dec!(-1), 1, Position::Long).is_err());
        assert!(generate_curve(&put_terms(), dec!(1), 0, Position::Long).is_err());
        assert!(generate_curve_with(&BlackScholes, &put_terms(), dec!(1), 1, Position::Long, 1).is_err());
        let bad = ContractTerms {
            spot_price: dec!(0),
            ..put_terms()
        };
        assert!(generate_curve(&bad, dec!(1), 1, Position::Long).is_err());
    }

    #[test]
    fn test_find_breakevens_zero_run() {
        let samples = vec![
            PayoffSample { underlying_price: dec!(1), profit_loss: dec!(-2) },
            PayoffSample { underlying_price: dec!(2), profit_loss: dec!(0) },
            PayoffSample { underlying_price: dec!(3), profit_loss: dec!(0) },
            PayoffSample { underlying_price: dec!(4), profit_loss: dec!(2) },
            PayoffSample { underlying_price: dec!(5), profit_loss: dec!(-2) },
        ];
        assert_eq!(find_breakevens(&samples), vec![dec!(2), dec!(4.5)]);
    }

    fn payoff_input(premium: Option<Money>) -> PayoffInput {
        PayoffInput {
            option: OptionInput {
                spot_price: dec!(100),
                strike_price: dec!(100),
                time_to_expiry: None,
                days_to_expiry: Some(dec!(30)),
                risk_free_rate: dec!(0.05),
                volatility: dec!(0.20),
                dividend_yield: dec!(0),
                option_kind: OptionKind::Call,
            },
            position: Position::Short,
            premium,
            contracts: 1,
            price_steps: 50,
        }
    }

    #[test]
    fn test_report_uses_theoretical_premium() {
        let result = build_payoff_profile(&payoff_input(None)).unwrap();
        assert!(approx_eq(result.result.premium, dec!(2.4933768194), dec!(0.0001)));
        assert_eq!(result.result.at_expiration.len(), 51);
        assert_eq!(result.assumptions["premium_source"], "theoretical");
        assert_eq!(result.warnings, vec!["Loss potential is theoretically unlimited".to_string()]);
    }

    #[test]
    fn test_report_from_json_defaults() {
        let json = r#"{
            "spot_price": 100,
            "strike_price": 95,
            "days_to_expiry": 45,
            "volatility": "0.3",
            "option_kind": "put",
            "position": "short",
            "premium": "1.75"
        }"#;
        let input: PayoffInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.contracts, 1);
        assert_eq!(input.price_steps, DEFAULT_CURVE_STEPS);
        assert_eq!(input.option.risk_free_rate, DEFAULT_RISK_FREE_RATE);
        let result = build_payoff_profile(&input).unwrap();
        assert_eq!(result.result.breakeven, dec!(93.25));
        assert_eq!(result.result.max_profit, Some(dec!(175)));
    }
}
