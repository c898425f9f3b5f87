//! Decimal transcendental functions used by the pricing formulas.
//!
//! Everything here stays in `Decimal` (no f64 round-trips). Inputs that would
//! leave Decimal's range saturate instead of panicking; callers validate the
//! economically meaningful ranges before reaching these helpers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TWO_OVER_SQRT_PI: Decimal = dec!(1.1283791670955125738961589031);
const ONE_OVER_SQRT_PI: Decimal = dec!(0.5641895835477562869480794516);
const ONE_OVER_SQRT_TWO: Decimal = dec!(0.7071067811865475244008443621);
const ONE_OVER_SQRT_TWO_PI: Decimal = dec!(0.3989422804014326779399460599);

/// Below this exp(x) is smaller than Decimal's resolution.
const EXP_UNDERFLOW: Decimal = dec!(-66);
/// Above this exp(x) exceeds Decimal::MAX.
const EXP_OVERFLOW: Decimal = dec!(66);
/// Largest argument for which the Maclaurin series of erf is summed.
const ERF_SERIES_LIMIT: Decimal = dec!(5);
/// erf(z) == 1 to 28 decimal places beyond this.
const ERF_SATURATION: Decimal = dec!(9);
/// N(x) is 0 or 1 to Decimal resolution beyond this.
const NORM_SATURATION: Decimal = dec!(40);

const SERIES_EPSILON: Decimal = dec!(0.0000000000000000000000000001);

/// exp(x) by range reduction (exp(x) = exp(x/2)^2 for |x| > 2) and a Taylor
/// series on the reduced argument.
pub fn exp(x: Decimal) -> Decimal {
    if x < EXP_UNDERFLOW {
        return Decimal::ZERO;
    }
    if x > EXP_OVERFLOW {
        return Decimal::MAX;
    }

    let two = dec!(2);
    if x > two || x < -two {
        let half = exp(x / two);
        return half.checked_mul(half).unwrap_or(Decimal::MAX);
    }

    let mut sum = Decimal::ONE;
    let mut term = Decimal::ONE;
    for n in 1u32..=60 {
        term = term * x / Decimal::from(n);
        if term.is_zero() || term.abs() < SERIES_EPSILON {
            break;
        }
        sum += term;
    }
    sum
}

/// Natural log via Newton's method on exp(y) = x.
///
/// Returns `None` for non-positive input.
pub fn ln(x: Decimal) -> Option<Decimal> {
    if x <= Decimal::ZERO {
        return None;
    }
    if x == Decimal::ONE {
        return Some(Decimal::ZERO);
    }

    // Initial guess: count whole powers of e, then linearise the remainder.
    let e_approx = dec!(2.7182818284590452353602874714);
    let mut whole = Decimal::ZERO;
    let mut v = x;
    while v > e_approx {
        v /= e_approx;
        whole += Decimal::ONE;
    }
    while v < Decimal::ONE / e_approx {
        v *= e_approx;
        whole -= Decimal::ONE;
    }
    let mut y = whole + (v - Decimal::ONE);

    // y_{n+1} = y_n - 1 + x / exp(y_n)
    for _ in 0..50 {
        let ey = exp(y);
        if ey.is_zero() {
            break;
        }
        let next = y - Decimal::ONE + x / ey;
        let step = (next - y).abs();
        y = next;
        if step < SERIES_EPSILON * dec!(10) {
            break;
        }
    }
    Some(y)
}

/// Square root by Newton iteration after scaling the argument into [0.01, 100].
pub fn sqrt(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let hundred = dec!(100);
    let ten = dec!(10);
    let mut scaled = x;
    let mut factor = Decimal::ONE;
    while scaled > hundred {
        scaled /= hundred;
        factor *= ten;
    }
    while scaled < dec!(0.01) {
        scaled *= hundred;
        factor /= ten;
    }

    let two = dec!(2);
    let mut guess = (scaled + Decimal::ONE) / two;
    for _ in 0..40 {
        let next = (guess + scaled / guess) / two;
        if next == guess {
            break;
        }
        guess = next;
    }
    guess * factor
}

/// Error function.
///
/// Maclaurin series for |z| <= 5, asymptotic expansion of erfc beyond; the
/// absolute error stays below 1e-15 across the real line.
pub fn erf(z: Decimal) -> Decimal {
    if z.is_sign_negative() {
        return -erf(-z);
    }
    if z > ERF_SATURATION {
        return Decimal::ONE;
    }
    if z > ERF_SERIES_LIMIT {
        return Decimal::ONE - erfc_asymptotic(z);
    }

    // erf(z) = 2/sqrt(pi) * sum_n (-1)^n z^(2n+1) / (n! (2n+1))
    let z2 = z * z;
    let mut power = z;
    let mut sum = z;
    for n in 1u32..=200 {
        power = -power * z2 / Decimal::from(n);
        let contrib = power / Decimal::from(2 * n + 1);
        if contrib.is_zero() || contrib.abs() < SERIES_EPSILON {
            break;
        }
        sum += contrib;
    }
    (sum * TWO_OVER_SQRT_PI).min(Decimal::ONE)
}

/// erfc(z) ~ exp(-z^2) / (z sqrt(pi)) * sum_k (-1)^k (2k-1)!! / (2z^2)^k
fn erfc_asymptotic(z: Decimal) -> Decimal {
    let two_z2 = dec!(2) * z * z;
    let mut term = Decimal::ONE;
    let mut sum = Decimal::ONE;
    for k in 1u32..=12 {
        term = -term * Decimal::from(2 * k - 1) / two_z2;
        sum += term;
    }
    exp(-(z * z)) * ONE_OVER_SQRT_PI / z * sum
}

/// Standard normal PDF: phi(x) = exp(-x^2/2) / sqrt(2*pi)
pub fn norm_pdf(x: Decimal) -> Decimal {
    if x.abs() > NORM_SATURATION {
        return Decimal::ZERO;
    }
    exp(-(x * x) / dec!(2)) * ONE_OVER_SQRT_TWO_PI
}

/// Standard normal CDF: N(x) = (1 + erf(x / sqrt(2))) / 2
pub fn norm_cdf(x: Decimal) -> Decimal {
    if x > NORM_SATURATION {
        return Decimal::ONE;
    }
    if x < -NORM_SATURATION {
        return Decimal::ZERO;
    }
    (Decimal::ONE + erf(x * ONE_OVER_SQRT_TWO)) / dec!(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_exp_basic() {
        assert_eq!(exp(Decimal::ZERO), Decimal::ONE);
        assert!(approx_eq(exp(dec!(1)), dec!(2.718281828459045), dec!(0.000000000001)));
        assert!(approx_eq(exp(dec!(-5)), dec!(0.006737946999085467), dec!(0.000000000001)));
        assert!(approx_eq(exp(dec!(10)), dec!(22026.465794806718), dec!(0.0000001)));
    }

    #[test]
    fn test_exp_saturates() {
        assert_eq!(exp(dec!(-1000)), Decimal::ZERO);
        assert_eq!(exp(dec!(1000)), Decimal::MAX);
    }

    #[test]
    fn test_ln_basic() {
        assert_eq!(ln(Decimal::ONE), Some(Decimal::ZERO));
        let ln_e = ln(dec!(2.718281828459045235360287471)).unwrap();
        assert!(approx_eq(ln_e, Decimal::ONE, dec!(0.000000000001)));
        let ln_half = ln(dec!(0.5)).unwrap();
        assert!(approx_eq(ln_half, dec!(-0.6931471805599453), dec!(0.000000000001)));
        let ln_big = ln(dec!(1000000)).unwrap();
        assert!(approx_eq(ln_big, dec!(13.815510557964274), dec!(0.000000000001)));
    }

    #[test]
    fn test_ln_rejects_non_positive() {
        assert_eq!(ln(Decimal::ZERO), None);
        assert_eq!(ln(dec!(-3)), None);
    }

    #[test]
    fn test_sqrt_basic() {
        assert!(approx_eq(sqrt(dec!(4)), dec!(2), dec!(0.000000000001)));
        assert!(approx_eq(sqrt(dec!(2)), dec!(1.4142135623730951), dec!(0.000000000001)));
        assert!(approx_eq(sqrt(dec!(0.0000000001)), dec!(0.00001), dec!(0.000000000001)));
        assert!(approx_eq(sqrt(dec!(1000000)), dec!(1000), dec!(0.000000001)));
        assert_eq!(sqrt(dec!(-1)), Decimal::ZERO);
    }

    #[test]
    fn test_erf_reference_values() {
        assert_eq!(erf(Decimal::ZERO), Decimal::ZERO);
        assert!(approx_eq(erf(dec!(0.5)), dec!(0.5204998778130465), dec!(0.000000000001)));
        assert!(approx_eq(erf(dec!(-1)), dec!(-0.8427007929497149), dec!(0.000000000001)));
        assert!(approx_eq(erf(dec!(3)), dec!(0.9999779095030014), dec!(0.000000000001)));
        assert!(approx_eq(erf(dec!(6)), Decimal::ONE, dec!(0.000000000001)));
        assert_eq!(erf(dec!(50)), Decimal::ONE);
    }

    #[test]
    fn test_norm_cdf_reference_values() {
        assert_eq!(norm_cdf(Decimal::ZERO), dec!(0.5));
        assert!(approx_eq(norm_cdf(dec!(1.96)), dec!(0.9750021048517795), dec!(0.000000000001)));
        assert!(approx_eq(norm_cdf(dec!(-1)), dec!(0.15865525393145707), dec!(0.000000000001)));
        assert_eq!(norm_cdf(dec!(1000000000)), Decimal::ONE);
        assert_eq!(norm_cdf(dec!(-1000000000)), Decimal::ZERO);
    }

    #[test]
    fn test_norm_cdf_symmetry() {
        for x in [dec!(0.1), dec!(0.75), dec!(2.5), dec!(6.2)] {
            let sum = norm_cdf(x) + norm_cdf(-x);
            assert!(approx_eq(sum, Decimal::ONE, dec!(0.000000000001)), "x={x}");
        }
    }

    #[test]
    fn test_norm_pdf_peak() {
        assert!(approx_eq(norm_pdf(Decimal::ZERO), dec!(0.3989422804014327), dec!(0.000000000001)));
        assert_eq!(norm_pdf(dec!(100)), Decimal::ZERO);
    }
}
