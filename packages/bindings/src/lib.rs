use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use option_yield_core::pricing::expiry;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn price_option(input_json: String) -> NapiResult<String> {
    let input: option_yield_core::pricing::valuation::OptionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        option_yield_core::pricing::valuation::price_option(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Bare price and Greeks without the report envelope.
#[napi]
pub fn calculate_greeks(input_json: String) -> NapiResult<String> {
    let input: option_yield_core::pricing::valuation::OptionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let terms = input.terms().map_err(to_napi_error)?;
    let greeks = option_yield_core::pricing::calculate_all(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&greeks).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Seller yield
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_seller_yield(input_json: String) -> NapiResult<String> {
    let input: option_yield_core::yield_analysis::seller::YieldInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = option_yield_core::yield_analysis::seller::analyze_seller_yield(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Payoff
// ---------------------------------------------------------------------------

#[napi]
pub fn build_payoff_profile(input_json: String) -> NapiResult<String> {
    let input: option_yield_core::payoff::curve::PayoffInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        option_yield_core::payoff::curve::build_payoff_profile(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

/// Calendar days between two `YYYY-MM-DD` dates, returned with the one-day
/// floor and the matching year fraction.
#[napi]
pub fn days_to_expiry(valuation_date: String, expiry_date: String) -> NapiResult<String> {
    let valuation = expiry::parse_date("valuation_date", &valuation_date).map_err(to_napi_error)?;
    let expiry_on = expiry::parse_date("expiry_date", &expiry_date).map_err(to_napi_error)?;
    let days = Decimal::from(expiry::days_between(valuation, expiry_on).map_err(to_napi_error)?);
    let years = expiry::year_fraction(days).map_err(to_napi_error)?;
    let out = serde_json::json!({
        "days": days,
        "clamped_days": expiry::clamp_days(days),
        "time_to_expiry": years,
    });
    serde_json::to_string(&out).map_err(to_napi_error)
}
