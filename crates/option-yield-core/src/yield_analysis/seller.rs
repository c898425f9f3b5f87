//! Seller-side economics of writing a single option: covered calls and
//! cash-secured puts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::OptionYieldError;
use crate::pricing::black_scholes::{BlackScholes, ContractTerms, OptionPricer};
use crate::pricing::expiry;
use crate::types::*;
use crate::OptionYieldResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerStance {
    /// Short call written against 100 owned shares per contract.
    CoveredCall,
    /// Short put collateralised with strike x 100 in cash per contract.
    CashSecuredPut,
}

impl SellerStance {
    pub fn for_kind(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Call => SellerStance::CoveredCall,
            OptionKind::Put => SellerStance::CashSecuredPut,
        }
    }
}

/// Presentation bucket for a yield ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YieldQuality {
    Negative,
    Low,
    Moderate,
    Good,
    Excellent,
}

impl YieldQuality {
    pub fn classify(rate: Rate) -> Self {
        if rate < Decimal::ZERO {
            YieldQuality::Negative
        } else if rate >= dec!(0.30) {
            YieldQuality::Excellent
        } else if rate >= dec!(0.15) {
            YieldQuality::Good
        } else if rate >= dec!(0.08) {
            YieldQuality::Moderate
        } else {
            YieldQuality::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldQualities {
    pub period_yield: YieldQuality,
    pub annualized_yield: YieldQuality,
    pub monthly_yield: YieldQuality,
    pub assigned_return: YieldQuality,
    pub assigned_annualized_return: YieldQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldMetrics {
    pub stance: SellerStance,
    pub period_yield: Rate,
    pub annualized_yield: Rate,
    pub monthly_yield: Rate,
    pub premium_per_day: Money,
    pub capital_required: Money,
    pub assigned_return: Rate,
    pub assigned_annualized_return: Rate,
    /// Net sale price (calls) or net cost basis (puts) if assigned.
    pub effective_price: Money,
    pub quality: YieldQualities,
}

/// Outcome of a yield analysis. `Undefined` is returned for a worthless or
/// unknown premium and is distinct from a zero yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SellerYield {
    Undefined,
    Defined(YieldMetrics),
}

impl SellerYield {
    pub fn metrics(&self) -> Option<&YieldMetrics> {
        match self {
            SellerYield::Defined(m) => Some(m),
            SellerYield::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, SellerYield::Undefined)
    }
}

// ---------------------------------------------------------------------------
// Core analysis
// ---------------------------------------------------------------------------

/// Seller yield for one contract. `days_to_expiry` must already be at least
/// one day; see [`expiry::clamp_days`].
pub fn analyze_yield(
    spot: Money,
    strike: Money,
    days_to_expiry: Decimal,
    premium: Money,
    kind: OptionKind,
) -> OptionYieldResult<SellerYield> {
    if spot <= Decimal::ZERO {
        return Err(OptionYieldError::invalid("spot_price", "must be positive"));
    }
    if strike <= Decimal::ZERO {
        return Err(OptionYieldError::invalid("strike_price", "must be positive"));
    }
    if days_to_expiry < MIN_DAYS_TO_EXPIRY {
        return Err(OptionYieldError::invalid(
            "days_to_expiry",
            "must be at least one day",
        ));
    }
    if premium <= Decimal::ZERO {
        return Ok(SellerYield::Undefined);
    }

    seller_metrics(spot, strike, days_to_expiry, premium, kind)
        .map(SellerYield::Defined)
        .ok_or_else(|| OptionYieldError::out_of_range("premium"))
}

/// `None` when a ratio or notional leaves Decimal's range.
fn seller_metrics(
    spot: Money,
    strike: Money,
    days_to_expiry: Decimal,
    premium: Money,
    kind: OptionKind,
) -> Option<YieldMetrics> {
    let annualizer = DAYS_PER_YEAR / days_to_expiry;
    let period_yield = premium.checked_div(spot)?;
    let annualized_yield = period_yield.checked_mul(annualizer)?;
    let monthly_yield = annualized_yield / dec!(12);

    let (capital_required, assigned_return, effective_price) = match kind {
        // Shares called away at the strike; premium kept.
        OptionKind::Call => (
            spot.checked_mul(CONTRACT_MULTIPLIER)?,
            premium
                .checked_add(strike.checked_sub(spot)?)?
                .checked_div(spot)?,
            strike.checked_add(premium)?,
        ),
        // Shares put to the seller; premium lowers the cost basis.
        OptionKind::Put => (
            strike.checked_mul(CONTRACT_MULTIPLIER)?,
            premium.checked_div(strike)?,
            strike.checked_sub(premium)?,
        ),
    };
    let assigned_annualized_return = assigned_return.checked_mul(annualizer)?;

    Some(YieldMetrics {
        stance: SellerStance::for_kind(kind),
        period_yield,
        annualized_yield,
        monthly_yield,
        premium_per_day: premium / days_to_expiry,
        capital_required,
        assigned_return,
        assigned_annualized_return,
        effective_price,
        quality: YieldQualities {
            period_yield: YieldQuality::classify(period_yield),
            annualized_yield: YieldQuality::classify(annualized_yield),
            monthly_yield: YieldQuality::classify(monthly_yield),
            assigned_return: YieldQuality::classify(assigned_return),
            assigned_annualized_return: YieldQuality::classify(assigned_annualized_return),
        },
    })
}

// ---------------------------------------------------------------------------
// Report: premium resolution + analysis
// ---------------------------------------------------------------------------

/// Yield request. The premium is taken from `premium`, else the bid/ask
/// midpoint, else a theoretical price from `volatility`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldInput {
    pub spot_price: Money,
    pub strike_price: Money,
    pub days_to_expiry: Decimal,
    pub option_kind: OptionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<Rate>,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: Rate,
    #[serde(default)]
    pub dividend_yield: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumSource {
    Quoted,
    Mid,
    Theoretical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerYieldOutput {
    pub premium: Money,
    pub premium_source: PremiumSource,
    pub days_to_expiry: Decimal,
    #[serde(rename = "yield")]
    pub seller_yield: SellerYield,
}

/// Chooses the premium to analyse, pricing through `pricer` when only a
/// volatility is available. `days_to_expiry` is the unfloored count, so an
/// expired contract is priced at its intrinsic value.
pub fn resolve_premium<P: OptionPricer>(
    pricer: &P,
    input: &YieldInput,
    days_to_expiry: Decimal,
) -> OptionYieldResult<(Money, PremiumSource)> {
    if let Some(premium) = input.premium {
        return Ok((premium, PremiumSource::Quoted));
    }

    match (input.bid, input.ask) {
        (Some(bid), Some(ask)) => {
            if bid < Decimal::ZERO {
                return Err(OptionYieldError::invalid("bid", "must not be negative"));
            }
            if ask < bid {
                return Err(OptionYieldError::invalid("ask", "must not be below bid"));
            }
            return Ok((bid + (ask - bid) / dec!(2), PremiumSource::Mid));
        }
        (Some(_), None) => {
            return Err(OptionYieldError::invalid("ask", "required when bid is given"));
        }
        (None, Some(_)) => {
            return Err(OptionYieldError::invalid("bid", "required when ask is given"));
        }
        (None, None) => {}
    }

    if let Some(volatility) = input.volatility {
        let terms = ContractTerms::new(
            input.option_kind,
            input.spot_price,
            input.strike_price,
            expiry::year_fraction(days_to_expiry)?,
            input.risk_free_rate,
            volatility,
            input.dividend_yield,
        )?;
        return Ok((pricer.price(&terms)?, PremiumSource::Theoretical));
    }

    Err(OptionYieldError::invalid(
        "premium",
        "supply a premium, a bid/ask pair, or a volatility",
    ))
}

pub fn analyze_seller_yield(
    input: &YieldInput,
) -> OptionYieldResult<ComputationOutput<SellerYieldOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.days_to_expiry < Decimal::ZERO {
        return Err(OptionYieldError::invalid(
            "days_to_expiry",
            "must not be negative",
        ));
    }
    let days = expiry::clamp_days(input.days_to_expiry);
    if days != input.days_to_expiry {
        warnings.push(format!(
            "days_to_expiry {} floored to {} day",
            input.days_to_expiry, MIN_DAYS_TO_EXPIRY
        ));
    }

    let (premium, premium_source) =
        resolve_premium(&BlackScholes, input, input.days_to_expiry)?;
    let seller_yield = analyze_yield(
        input.spot_price,
        input.strike_price,
        days,
        premium,
        input.option_kind,
    )?;

    if seller_yield.is_undefined() {
        tracing::warn!(%premium, "premium is not positive; seller yield undefined");
        warnings.push("Premium is zero or negative; seller yield is undefined".to_string());
    } else {
        tracing::debug!(
            kind = input.option_kind.label(),
            %premium,
            %days,
            "analysed seller yield"
        );
    }

    let output = SellerYieldOutput {
        premium,
        premium_source,
        days_to_expiry: days,
        seller_yield,
    };

    let stance = SellerStance::for_kind(input.option_kind);
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Option seller yield — premium over committed capital, annualised on 365 days",
        &serde_json::json!({
            "stance": stance,
            "premium_source": premium_source,
            "contract_multiplier": CONTRACT_MULTIPLIER.to_string(),
            "days_per_year": DAYS_PER_YEAR.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
