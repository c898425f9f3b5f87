//! Calendar helpers for turning expiration dates into the day counts and year
//! fractions the pricing and yield formulas consume.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::OptionYieldError;
use crate::types::*;
use crate::OptionYieldResult;

pub fn parse_date(field: &str, value: &str) -> OptionYieldResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| OptionYieldError::DateError(format!("{field} '{value}': {e}")))
}

/// Calendar days from the valuation date to expiry. Expiry on the valuation
/// date itself is zero days.
pub fn days_between(valuation_date: NaiveDate, expiry_date: NaiveDate) -> OptionYieldResult<i64> {
    let days = (expiry_date - valuation_date).num_days();
    if days < 0 {
        return Err(OptionYieldError::DateError(format!(
            "expiry_date {expiry_date} is before valuation date {valuation_date}"
        )));
    }
    Ok(days)
}

/// Floors a day count at one day so yield annualisation never divides by zero.
pub fn clamp_days(days: Decimal) -> Decimal {
    days.max(MIN_DAYS_TO_EXPIRY)
}

pub fn year_fraction(days: Decimal) -> OptionYieldResult<Years> {
    if days < Decimal::ZERO {
        return Err(OptionYieldError::invalid(
            "days_to_expiry",
            "must not be negative",
        ));
    }
    Ok(days / DAYS_PER_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_days_between() {
        let v = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let e = NaiveDate::from_ymd_opt(2024, 2, 16).unwrap();
        assert_eq!(days_between(v, e).unwrap(), 32);
        assert_eq!(days_between(v, v).unwrap(), 0);
    }

    #[test]
    fn test_days_between_rejects_past_expiry() {
        let v = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let e = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        assert!(matches!(
            days_between(v, e),
            Err(OptionYieldError::DateError(_))
        ));
    }

    #[test]
    fn test_clamp_days() {
        assert_eq!(clamp_days(dec!(0)), dec!(1));
        assert_eq!(clamp_days(dec!(0.4)), dec!(1));
        assert_eq!(clamp_days(dec!(21)), dec!(21));
    }

    #[test]
    fn test_year_fraction() {
        assert_eq!(year_fraction(dec!(365)).unwrap(), dec!(1));
        assert_eq!(year_fraction(dec!(0)).unwrap(), dec!(0));
        assert!(year_fraction(dec!(-1)).is_err());
    }

    #[test]
    fn test_parse_date() {
        let d = parse_date("expiry_date", "2025-06-20").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 6, 20).unwrap());
        assert!(matches!(
            parse_date("expiry_date", "20/06/2025"),
            Err(OptionYieldError::DateError(_))
        ));
    }
}
