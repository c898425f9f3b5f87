//! Closed-form Black-Scholes-Merton pricing of European options with a
//! continuous dividend yield.
//!
//! d1 = (ln(S/K) + (r - q + sigma^2/2) T) / (sigma sqrt(T)),  d2 = d1 - sigma sqrt(T)
//!
//! At T = 0 every quantity collapses to its expiration boundary: price is the
//! intrinsic value, delta and probability ITM are 0/1 by moneyness (one half
//! exactly at the strike, the T -> 0+ limit), and the remaining Greeks are zero.
//!
//! All products run through checked arithmetic: terms whose discounted legs or
//! Greeks leave Decimal's range are rejected as invalid input.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::OptionYieldError;
use crate::math;
use crate::types::*;
use crate::OptionYieldResult;

/// Discount exponents beyond this leave Decimal's range.
const MAX_DISCOUNT_EXPONENT: Decimal = dec!(60);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Contract terms and market parameters for one European option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub spot_price: Money,
    pub strike_price: Money,
    /// Years to expiry; zero means the contract is at expiration.
    pub time_to_expiry: Years,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: Rate,
    pub volatility: Rate,
    #[serde(default)]
    pub dividend_yield: Rate,
    pub option_kind: OptionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreeksResult {
    pub price: Money,
    pub delta: Decimal,
    pub gamma: Decimal,
    /// Per calendar day.
    pub theta: Decimal,
    /// Per 1 percentage-point move in volatility.
    pub vega: Decimal,
    /// Per 1 percentage-point move in the risk-free rate.
    pub rho: Decimal,
}

impl ContractTerms {
    pub fn new(
        option_kind: OptionKind,
        spot_price: Money,
        strike_price: Money,
        time_to_expiry: Years,
        risk_free_rate: Rate,
        volatility: Rate,
        dividend_yield: Rate,
    ) -> OptionYieldResult<Self> {
        let terms = ContractTerms {
            spot_price,
            strike_price,
            time_to_expiry,
            risk_free_rate,
            volatility,
            dividend_yield,
            option_kind,
        };
        terms.validate()?;
        Ok(terms)
    }

    pub fn validate(&self) -> OptionYieldResult<()> {
        if self.spot_price <= Decimal::ZERO {
            return Err(OptionYieldError::invalid("spot_price", "must be positive"));
        }
        if self.strike_price <= Decimal::ZERO {
            return Err(OptionYieldError::invalid("strike_price", "must be positive"));
        }
        if self.time_to_expiry < Decimal::ZERO {
            return Err(OptionYieldError::invalid(
                "time_to_expiry",
                "must not be negative",
            ));
        }
        if self.time_to_expiry > Decimal::ZERO && self.volatility <= Decimal::ZERO {
            return Err(OptionYieldError::invalid(
                "volatility",
                "must be positive before expiration",
            ));
        }
        let rate_exponent = self
            .risk_free_rate
            .checked_mul(self.time_to_expiry)
            .ok_or_else(|| OptionYieldError::out_of_range("risk_free_rate"))?;
        if rate_exponent.abs() > MAX_DISCOUNT_EXPONENT {
            return Err(OptionYieldError::invalid(
                "risk_free_rate",
                "rate times time to expiry is out of range",
            ));
        }
        let yield_exponent = self
            .dividend_yield
            .checked_mul(self.time_to_expiry)
            .ok_or_else(|| OptionYieldError::out_of_range("dividend_yield"))?;
        if yield_exponent.abs() > MAX_DISCOUNT_EXPONENT {
            return Err(OptionYieldError::invalid(
                "dividend_yield",
                "yield times time to expiry is out of range",
            ));
        }
        Ok(())
    }

    pub fn is_expired(&self) -> bool {
        self.time_to_expiry.is_zero()
    }

    /// Same contract revalued at another underlying price.
    pub fn with_spot(&self, spot_price: Money) -> Self {
        ContractTerms { spot_price, ..*self }
    }

    pub fn with_kind(&self, option_kind: OptionKind) -> Self {
        ContractTerms {
            option_kind,
            ..*self
        }
    }
}

// ---------------------------------------------------------------------------
// Pricer trait
// ---------------------------------------------------------------------------

/// A European option pricing model.
///
/// Implementations are stateless and every method is a pure function of the
/// terms, so a pricer can be shared freely across threads.
pub trait OptionPricer: Send + Sync {
    fn name(&self) -> &'static str;

    fn price(&self, terms: &ContractTerms) -> OptionYieldResult<Money>;

    fn delta(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal>;

    fn gamma(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal>;

    fn theta(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal>;

    fn vega(&self, _terms: &ContractTerms) -> OptionYieldResult<Decimal>;

    fn rho(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal>;

    /// Risk-neutral probability of finishing in the money.
    fn probability_itm(&self, terms: &ContractTerms) -> OptionYieldResult<Rate>;

    /// Price and all five Greeks from one shared d1/d2 evaluation.
    fn calculate_all(&self, terms: &ContractTerms) -> OptionYieldResult<GreeksResult>;
}

/// Closed-form Black-Scholes-Merton.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholes;

impl OptionPricer for BlackScholes {
    fn name(&self) -> &'static str {
        "Black-Scholes-Merton"
    }

    fn price(&self, terms: &ContractTerms) -> OptionYieldResult<Money> {
        Ok(match Valuation::of(terms)? {
            Valuation::Expired => intrinsic_value(terms.option_kind, terms.spot_price, terms.strike_price),
            Valuation::Live(p) => p.price(terms)?,
        })
    }

    fn delta(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        Ok(match Valuation::of(terms)? {
            Valuation::Expired => expired_indicator(terms) * kind_sign(terms.option_kind),
            Valuation::Live(p) => p.delta(terms)?,
        })
    }

    fn gamma(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        Ok(match Valuation::of(terms)? {
            Valuation::Expired => Decimal::ZERO,
            Valuation::Live(p) => p.gamma(terms)?,
        })
    }

    fn theta(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        Ok(match Valuation::of(terms)? {
            Valuation::Expired => Decimal::ZERO,
            Valuation::Live(p) => p.theta(terms)?,
        })
    }

    fn vega(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        Ok(match Valuation::of(terms)? {
            Valuation::Expired => Decimal::ZERO,
            Valuation::Live(p) => p.vega(terms)?,
        })
    }

    fn rho(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        Ok(match Valuation::of(terms)? {
            Valuation::Expired => Decimal::ZERO,
            Valuation::Live(p) => p.rho(terms)?,
        })
    }

    fn probability_itm(&self, terms: &ContractTerms) -> OptionYieldResult<Rate> {
        Ok(match Valuation::of(terms)? {
            Valuation::Expired => expired_indicator(terms),
            Valuation::Live(p) => p.probability_itm(terms.option_kind),
        })
    }

    fn calculate_all(&self, terms: &ContractTerms) -> OptionYieldResult<GreeksResult> {
        Ok(match Valuation::of(terms)? {
            Valuation::Expired => GreeksResult {
                price: intrinsic_value(terms.option_kind, terms.spot_price, terms.strike_price),
                delta: expired_indicator(terms) * kind_sign(terms.option_kind),
                gamma: Decimal::ZERO,
                theta: Decimal::ZERO,
                vega: Decimal::ZERO,
                rho: Decimal::ZERO,
            },
            Valuation::Live(p) => GreeksResult {
                price: p.price(terms)?,
                delta: p.delta(terms)?,
                gamma: p.gamma(terms)?,
                theta: p.theta(terms)?,
                vega: p.vega(terms)?,
                rho: p.rho(terms)?,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Free-function surface
// ---------------------------------------------------------------------------

pub fn price(terms: &ContractTerms) -> OptionYieldResult<Money> {
    BlackScholes.price(terms)
}

pub fn delta(terms: &ContractTerms) -> OptionYieldResult<Decimal> {
    BlackScholes.delta(terms)
}

pub fn gamma(terms: &ContractTerms) -> OptionYieldResult<Decimal> {
    BlackScholes.gamma(terms)
}

pub fn theta(terms: &ContractTerms) -> OptionYieldResult<Decimal> {
    BlackScholes.theta(terms)
}

pub fn vega(terms: &ContractTerms) -> OptionYieldResult<Decimal> {
    BlackScholes.vega(terms)
}

pub fn rho(terms: &ContractTerms) -> OptionYieldResult<Decimal> {
    BlackScholes.rho(terms)
}

pub fn probability_itm(terms: &ContractTerms) -> OptionYieldResult<Rate> {
    BlackScholes.probability_itm(terms)
}

pub fn calculate_all(terms: &ContractTerms) -> OptionYieldResult<GreeksResult> {
    BlackScholes.calculate_all(terms)
}

pub fn intrinsic_value(kind: OptionKind, spot: Money, strike: Money) -> Money {
    match kind {
        OptionKind::Call => (spot - strike).max(Decimal::ZERO),
        OptionKind::Put => (strike - spot).max(Decimal::ZERO),
    }
}

/// Underlying level at expiry where intrinsic value equals the premium.
pub fn breakeven(kind: OptionKind, strike: Money, premium: Money) -> Money {
    match kind {
        OptionKind::Call => strike + premium,
        OptionKind::Put => strike - premium,
    }
}

// ---------------------------------------------------------------------------
// Black-Scholes internals
// ---------------------------------------------------------------------------

enum Valuation {
    Expired,
    Live(BsParams),
}

impl Valuation {
    fn of(terms: &ContractTerms) -> OptionYieldResult<Self> {
        terms.validate()?;
        if terms.is_expired() {
            Ok(Valuation::Expired)
        } else {
            BsParams::compute(terms).map(Valuation::Live)
        }
    }
}

struct BsParams {
    d1: Decimal,
    d2: Decimal,
    sqrt_t: Decimal,
    sigma_sqrt_t: Decimal,
    exp_neg_qt: Decimal,
    /// S e^(-qT)
    spot_leg: Money,
    /// K e^(-rT)
    strike_leg: Money,
}

/// d1 = (ln(S/K) + (r - q + sigma^2/2) T) / (sigma sqrt(T))
fn d1_of(ln_s_k: Decimal, terms: &ContractTerms, sigma_sqrt_t: Decimal) -> Option<Decimal> {
    let sigma = terms.volatility;
    let half_variance = sigma.checked_mul(sigma)? / dec!(2);
    let drift = terms
        .risk_free_rate
        .checked_sub(terms.dividend_yield)?
        .checked_add(half_variance)?
        .checked_mul(terms.time_to_expiry)?;
    ln_s_k.checked_add(drift)?.checked_div(sigma_sqrt_t)
}

impl BsParams {
    fn compute(terms: &ContractTerms) -> OptionYieldResult<Self> {
        let s = terms.spot_price;
        let k = terms.strike_price;
        let t = terms.time_to_expiry;

        let ln_s_k = s
            .checked_div(k)
            .and_then(math::ln)
            .ok_or_else(|| OptionYieldError::invalid("spot_price", "spot/strike ratio out of range"))?;
        let sqrt_t = math::sqrt(t);
        let sigma_sqrt_t = terms
            .volatility
            .checked_mul(sqrt_t)
            .ok_or_else(|| OptionYieldError::out_of_range("volatility"))?;
        if sigma_sqrt_t.is_zero() {
            return Err(OptionYieldError::invalid(
                "time_to_expiry",
                "too small to resolve against volatility",
            ));
        }
        let d1 = d1_of(ln_s_k, terms, sigma_sqrt_t)
            .ok_or_else(|| OptionYieldError::out_of_range("volatility"))?;
        let d2 = d1
            .checked_sub(sigma_sqrt_t)
            .ok_or_else(|| OptionYieldError::out_of_range("volatility"))?;

        // |rT| and |qT| are bounded by validate, so neither exponent overflows.
        let exp_neg_qt = math::exp(-terms.dividend_yield * t);
        let spot_leg = s
            .checked_mul(exp_neg_qt)
            .ok_or_else(|| OptionYieldError::out_of_range("dividend_yield"))?;
        let strike_leg = k
            .checked_mul(math::exp(-terms.risk_free_rate * t))
            .ok_or_else(|| OptionYieldError::out_of_range("risk_free_rate"))?;

        Ok(BsParams {
            d1,
            d2,
            sqrt_t,
            sigma_sqrt_t,
            exp_neg_qt,
            spot_leg,
            strike_leg,
        })
    }

    // Each leg is at most its discounted notional, so the difference stays in range.
    fn price(&self, terms: &ContractTerms) -> OptionYieldResult<Money> {
        let value = match terms.option_kind {
            OptionKind::Call => {
                self.spot_leg * math::norm_cdf(self.d1)
                    - self.strike_leg * math::norm_cdf(self.d2)
            }
            OptionKind::Put => {
                self.strike_leg * math::norm_cdf(-self.d2)
                    - self.spot_leg * math::norm_cdf(-self.d1)
            }
        };
        Ok(value.max(Decimal::ZERO))
    }

    fn delta(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        Ok(match terms.option_kind {
            OptionKind::Call => self.exp_neg_qt * math::norm_cdf(self.d1),
            OptionKind::Put => -self.exp_neg_qt * math::norm_cdf(-self.d1),
        })
    }

    // gamma = e^(-qT) n(d1) / (S sigma sqrt(T))
    fn gamma(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        terms
            .spot_price
            .checked_mul(self.sigma_sqrt_t)
            .and_then(|denom| (self.exp_neg_qt * math::norm_pdf(self.d1)).checked_div(denom))
            .ok_or_else(|| OptionYieldError::out_of_range("spot_price"))
    }

    fn theta(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        self.annual_theta(terms)
            .map(|annual| annual / DAYS_PER_YEAR)
            .ok_or_else(|| OptionYieldError::out_of_range("time_to_expiry"))
    }

    fn annual_theta(&self, terms: &ContractTerms) -> Option<Decimal> {
        let r = terms.risk_free_rate;
        let q = terms.dividend_yield;
        let decay = -(self.spot_leg * math::norm_pdf(self.d1))
            .checked_mul(terms.volatility)?
            .checked_div(dec!(2) * self.sqrt_t)?;

        let (n_d1, n_d2, sign) = match terms.option_kind {
            OptionKind::Call => (math::norm_cdf(self.d1), math::norm_cdf(self.d2), Decimal::ONE),
            OptionKind::Put => (math::norm_cdf(-self.d1), math::norm_cdf(-self.d2), -Decimal::ONE),
        };
        let carry_strike = r.checked_mul(self.strike_leg * n_d2)?;
        let carry_spot = q.checked_mul(self.spot_leg * n_d1)?;
        decay
            .checked_sub(sign * carry_strike)?
            .checked_add(sign * carry_spot)
    }

    fn vega(&self, _terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        (self.spot_leg * math::norm_pdf(self.d1))
            .checked_mul(self.sqrt_t)
            .map(|v| v / dec!(100))
            .ok_or_else(|| OptionYieldError::out_of_range("time_to_expiry"))
    }

    fn rho(&self, terms: &ContractTerms) -> OptionYieldResult<Decimal> {
        let n_d2 = match terms.option_kind {
            OptionKind::Call => math::norm_cdf(self.d2),
            OptionKind::Put => -math::norm_cdf(-self.d2),
        };
        (self.strike_leg * n_d2)
            .checked_mul(terms.time_to_expiry)
            .map(|v| v / dec!(100))
            .ok_or_else(|| OptionYieldError::out_of_range("time_to_expiry"))
    }

    fn probability_itm(&self, kind: OptionKind) -> Rate {
        match kind {
            OptionKind::Call => math::norm_cdf(self.d2),
            OptionKind::Put => math::norm_cdf(-self.d2),
        }
    }
}

/// 1 when an expired contract finishes in the money, 0 when out of it, and
/// one half exactly at the strike so calls and puts stay complementary.
fn expired_indicator(terms: &ContractTerms) -> Decimal {
    let gap = terms.spot_price - terms.strike_price;
    let itm = match terms.option_kind {
        OptionKind::Call => gap > Decimal::ZERO,
        OptionKind::Put => gap < Decimal::ZERO,
    };
    if gap.is_zero() {
        dec!(0.5)
    } else if itm {
        Decimal::ONE
    } else {
        Decimal::ZERO
    }
}

fn kind_sign(kind: OptionKind) -> Decimal {
    match kind {
        OptionKind::Call => Decimal::ONE,
        OptionKind::Put => -Decimal::ONE,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
