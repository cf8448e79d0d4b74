//! Numeric tower used for quantities and conversion factors.
//!
//! Exact kinds (integers, rationals, decimals) are combined through
//! arbitrary-precision rationals and demoted back to the narrowest kind that
//! represents the result. Any operation touching a [`SigFig`] produces a
//! [`SigFig`]; any operation touching [`Number::Dne`] produces `Dne`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rust_decimal::{Decimal, MathematicalOps};

use super::errors::{NumericError, NumericResult};
use super::sigfig::SigFig;

/// A number of one of the supported kinds.
#[derive(Debug, Clone)]
pub enum Number {
    Integer(BigInt),
    /// Exact fraction; never integral (those demote to `Integer`).
    Rational(BigRational),
    Decimal(Decimal),
    SigFig(SigFig),
    /// "Does not exist": the result of dividing by zero.
    Dne,
}

/// Discriminant of [`Number`], handy for assertions and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Integer,
    Rational,
    Decimal,
    SigFig,
    Dne,
}

// ============================================================================
// Conversions between kinds
// ============================================================================

fn decimal_to_rational(d: Decimal) -> BigRational {
    BigRational::new(BigInt::from(d.mantissa()), BigInt::from(10).pow(d.scale()))
}

/// Exact decimal for a rational with a terminating expansion.
fn rational_to_decimal(r: &BigRational) -> Option<Decimal> {
    let two = BigInt::from(2);
    let five = BigInt::from(5);
    let mut rest = r.denom().clone();
    let (mut twos, mut fives) = (0u32, 0u32);
    while (&rest % &two).is_zero() {
        rest /= &two;
        twos += 1;
    }
    while (&rest % &five).is_zero() {
        rest /= &five;
        fives += 1;
    }
    if !rest.is_one() {
        return None;
    }
    let scale = twos.max(fives);
    if scale > 28 {
        return None;
    }
    let multiplier = BigInt::from(10).pow(scale) / r.denom();
    let mantissa = (r.numer() * multiplier).to_i128()?;
    Decimal::try_from_i128_with_scale(mantissa, scale).ok()
}

/// Nearest decimal for any rational; used when mixing with sigfigs.
fn rational_to_decimal_approx(r: &BigRational) -> NumericResult<Decimal> {
    if let Some(d) = rational_to_decimal(r) {
        return Ok(d);
    }
    let numer = r.numer().to_i128().ok_or(NumericError::Overflow)?;
    let denom = r.denom().to_i128().ok_or(NumericError::Overflow)?;
    let numer = Decimal::try_from_i128_with_scale(numer, 0).map_err(|_| NumericError::Overflow)?;
    let denom = Decimal::try_from_i128_with_scale(denom, 0).map_err(|_| NumericError::Overflow)?;
    numer.checked_div(denom).ok_or(NumericError::Overflow)
}

fn ten_to(exp: i32) -> BigRational {
    let magnitude = BigInt::from(10).pow(exp.unsigned_abs());
    if exp >= 0 {
        BigRational::from_integer(magnitude)
    } else {
        BigRational::new(BigInt::one(), magnitude)
    }
}

impl Number {
    /// Narrowest exact kind for `value`; `decimal` prefers a decimal result.
    fn exact(value: BigRational, decimal: bool) -> Number {
        if decimal {
            if let Some(d) = rational_to_decimal(&value) {
                return Number::Decimal(d);
            }
        }
        if value.is_integer() {
            Number::Integer(value.to_integer())
        } else {
            Number::Rational(value)
        }
    }

    /// Exact value of a non-sigfig, non-dne number.
    fn to_rational(&self) -> Option<BigRational> {
        match self {
            Number::Integer(i) => Some(BigRational::from_integer(i.clone())),
            Number::Rational(r) => Some(r.clone()),
            Number::Decimal(d) => Some(decimal_to_rational(*d)),
            Number::SigFig(s) => Some(decimal_to_rational(s.value())),
            Number::Dne => None,
        }
    }

    /// Decimal value plus precision (`None` means exact).
    fn limited(&self) -> NumericResult<(Decimal, Option<SigFig>)> {
        match self {
            Number::SigFig(s) => Ok((s.value(), Some(*s))),
            Number::Decimal(d) => Ok((*d, None)),
            other => {
                let r = other.to_rational().ok_or(NumericError::Overflow)?;
                Ok((rational_to_decimal_approx(&r)?, None))
            }
        }
    }

    fn is_decimal(&self) -> bool {
        matches!(self, Number::Decimal(_))
    }

    fn involves_sigfig(&self, rhs: &Number) -> bool {
        matches!(self, Number::SigFig(_)) || matches!(rhs, Number::SigFig(_))
    }

    fn product_sigfig(value: Decimal, a: Option<SigFig>, b: Option<SigFig>) -> NumericResult<Number> {
        let sigfigs = match (a, b) {
            (Some(a), Some(b)) => a.sigfigs().min(b.sigfigs()),
            (Some(s), None) | (None, Some(s)) => s.sigfigs(),
            (None, None) => return Ok(Number::Decimal(value)),
        };
        SigFig::with_sigfigs(value, sigfigs).map(Number::SigFig)
    }

    fn sum_sigfig(value: Decimal, a: Option<SigFig>, b: Option<SigFig>) -> NumericResult<Number> {
        let place = match (a, b) {
            (Some(a), Some(b)) => a.least_significant_place().max(b.least_significant_place()),
            (Some(s), None) | (None, Some(s)) => s.least_significant_place(),
            (None, None) => return Ok(Number::Decimal(value)),
        };
        SigFig::at_place(value, place).map(Number::SigFig)
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn kind(&self) -> NumberKind {
        match self {
            Number::Integer(_) => NumberKind::Integer,
            Number::Rational(_) => NumberKind::Rational,
            Number::Decimal(_) => NumberKind::Decimal,
            Number::SigFig(_) => NumberKind::SigFig,
            Number::Dne => NumberKind::Dne,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(i) => i.is_zero(),
            Number::Rational(r) => r.is_zero(),
            Number::Decimal(d) => d.is_zero(),
            Number::SigFig(s) => s.is_zero(),
            Number::Dne => false,
        }
    }

    pub fn is_one(&self) -> bool {
        self.to_rational().is_some_and(|r| r.is_one())
    }

    pub fn is_dne(&self) -> bool {
        matches!(self, Number::Dne)
    }

    /// Whether the value is a whole number (of any exact or sigfig kind).
    pub fn is_integral(&self) -> bool {
        self.to_rational().is_some_and(|r| r.is_integer())
    }

    /// The value as an `i32`, when it is a whole number in range.
    pub fn to_i32(&self) -> Option<i32> {
        let r = self.to_rational()?;
        if !r.is_integer() {
            return None;
        }
        r.to_integer().to_i32()
    }

    /// Relative trust in a factor of this kind, used to weigh conversion arcs.
    ///
    /// Exact kinds outrank inexact ones; sigfig numbers weigh as many as
    /// their significant figures.
    pub fn precision_weight(&self) -> f64 {
        match self {
            Number::Integer(_) => 100.0,
            Number::Rational(_) => 50.0,
            Number::Decimal(_) => 10.0,
            Number::SigFig(s) => f64::from(s.sigfigs()),
            Number::Dne => 0.0,
        }
    }

    /// Lossy float view, for diagnostics.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Number::Decimal(d) => d.to_f64(),
            Number::SigFig(s) => s.value().to_f64(),
            other => other.to_rational()?.to_f64(),
        }
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    pub fn checked_add(&self, rhs: &Number) -> NumericResult<Number> {
        if self.is_dne() || rhs.is_dne() {
            return Ok(Number::Dne);
        }
        if self.involves_sigfig(rhs) {
            let (a, pa) = self.limited()?;
            let (b, pb) = rhs.limited()?;
            let sum = a.checked_add(b).ok_or(NumericError::Overflow)?;
            return Self::sum_sigfig(sum, pa, pb);
        }
        match (self.to_rational(), rhs.to_rational()) {
            (Some(a), Some(b)) => Ok(Self::exact(a + b, self.is_decimal() || rhs.is_decimal())),
            _ => Ok(Number::Dne),
        }
    }

    pub fn checked_sub(&self, rhs: &Number) -> NumericResult<Number> {
        self.checked_add(&rhs.neg())
    }

    pub fn checked_mul(&self, rhs: &Number) -> NumericResult<Number> {
        if self.is_dne() || rhs.is_dne() {
            return Ok(Number::Dne);
        }
        if self.involves_sigfig(rhs) {
            let (a, pa) = self.limited()?;
            let (b, pb) = rhs.limited()?;
            let product = a.checked_mul(b).ok_or(NumericError::Overflow)?;
            return Self::product_sigfig(product, pa, pb);
        }
        match (self.to_rational(), rhs.to_rational()) {
            (Some(a), Some(b)) => Ok(Self::exact(a * b, self.is_decimal() || rhs.is_decimal())),
            _ => Ok(Number::Dne),
        }
    }

    /// Division; a zero divisor yields [`Number::Dne`].
    pub fn checked_div(&self, rhs: &Number) -> NumericResult<Number> {
        if self.is_dne() || rhs.is_dne() || rhs.is_zero() {
            return Ok(Number::Dne);
        }
        if self.involves_sigfig(rhs) {
            let (a, pa) = self.limited()?;
            let (b, pb) = rhs.limited()?;
            let quotient = a.checked_div(b).ok_or(NumericError::Overflow)?;
            return Self::product_sigfig(quotient, pa, pb);
        }
        match (self.to_rational(), rhs.to_rational()) {
            (Some(a), Some(b)) => Ok(Self::exact(a / b, self.is_decimal() || rhs.is_decimal())),
            _ => Ok(Number::Dne),
        }
    }

    /// Integer power; zero to a negative power yields [`Number::Dne`].
    pub fn checked_pow(&self, exp: i32) -> NumericResult<Number> {
        if self.is_dne() || (exp < 0 && self.is_zero()) {
            return Ok(Number::Dne);
        }
        match self {
            Number::SigFig(s) => s.checked_powi(i64::from(exp)).map(Number::SigFig),
            other => {
                let r = other.to_rational().ok_or(NumericError::Overflow)?;
                Ok(Self::exact(r.pow(exp), other.is_decimal()))
            }
        }
    }

    /// Power with an arbitrary exponent. Whole exponents stay exact;
    /// fractional ones go through decimal math.
    pub fn checked_pow_number(&self, exp: &Number) -> NumericResult<Number> {
        if let Some(n) = exp.to_i32() {
            return self.checked_pow(n);
        }
        if self.is_dne() || exp.is_dne() {
            return Ok(Number::Dne);
        }
        let (base, precision) = self.limited()?;
        let (power, _) = exp.limited()?;
        let value = base.checked_powd(power).ok_or_else(|| NumericError::NonIntegerPower {
            base: self.to_string(),
            exponent: exp.to_string(),
        })?;
        Self::product_sigfig(value, precision, None)
    }

    /// Multiply by `10^exp` exactly. Whole numbers shifted right become
    /// decimals.
    pub fn scale_pow10(&self, exp: i32) -> NumericResult<Number> {
        match self {
            Number::Dne => Ok(Number::Dne),
            Number::SigFig(s) => s.shifted(exp).map(Number::SigFig),
            Number::Integer(_) if exp >= 0 => {
                let r = self.to_rational().ok_or(NumericError::Overflow)?;
                Ok(Self::exact(r * ten_to(exp), false))
            }
            other => {
                let r = other.to_rational().ok_or(NumericError::Overflow)?;
                let decimal = other.is_decimal() || matches!(other, Number::Integer(_));
                Ok(Self::exact(r * ten_to(exp), decimal))
            }
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Integer(i) => Number::Integer(-i),
            Number::Rational(r) => Number::Rational(-r),
            Number::Decimal(d) => Number::Decimal(-*d),
            Number::SigFig(s) => match SigFig::at_place(-s.value(), s.least_significant_place()) {
                Ok(n) => Number::SigFig(n),
                Err(_) => Number::Dne,
            },
            Number::Dne => Number::Dne,
        }
    }

    /// Parse a literal: integers, decimals (`2.54`, `6.02e23`), and the
    /// explicit suffixes `s` (significant figures) and `d` (decimal).
    pub fn parse_literal(text: &str) -> NumericResult<Number> {
        let t = text.trim();
        if let Some(body) = t.strip_suffix('s') {
            return body.parse::<SigFig>().map(Number::SigFig);
        }
        if let Some(body) = t.strip_suffix('d') {
            return parse_decimal(body, text).map(Number::Decimal);
        }
        if t.contains(['.', 'e', 'E']) {
            return parse_decimal(t, text).map(Number::Decimal);
        }
        t.parse::<BigInt>()
            .map(Number::Integer)
            .map_err(|_| NumericError::InvalidLiteral(text.to_string()))
    }
}

fn parse_decimal(body: &str, original: &str) -> NumericResult<Decimal> {
    let parsed = if body.contains(['e', 'E']) {
        Decimal::from_scientific(body)
    } else {
        Decimal::from_str_exact(body)
    };
    parsed.map_err(|_| NumericError::InvalidLiteral(original.to_string()))
}

// ============================================================================
// Trait impls
// ============================================================================

impl FromStr for Number {
    type Err = NumericError;

    fn from_str(s: &str) -> NumericResult<Self> {
        Number::parse_literal(s)
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Integer(BigInt::from(v))
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Number::Integer(BigInt::from(v))
    }
}

impl From<BigInt> for Number {
    fn from(v: BigInt) -> Self {
        Number::Integer(v)
    }
}

impl From<BigRational> for Number {
    fn from(v: BigRational) -> Self {
        Number::exact(v, false)
    }
}

impl From<Decimal> for Number {
    fn from(v: Decimal) -> Self {
        Number::Decimal(v)
    }
}

impl From<SigFig> for Number {
    fn from(v: SigFig) -> Self {
        Number::SigFig(v)
    }
}

impl std::ops::Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        Number::neg(&self)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Dne, Number::Dne) => true,
            _ => self.partial_cmp(other) == Some(Ordering::Equal),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let a = self.to_rational()?;
        let b = other.to_rational()?;
        a.partial_cmp(&b)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Rational(r) => {
                if r.is_negative() {
                    write!(f, "-{}/{}", r.numer().abs(), r.denom())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Number::Decimal(d) => write!(f, "{d}"),
            Number::SigFig(s) => write!(f, "{s}"),
            Number::Dne => write!(f, "d.n.e."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Number {
        Number::parse_literal(s).unwrap()
    }

    #[test]
    fn test_literal_kinds() {
        assert_eq!(n("12").kind(), NumberKind::Integer);
        assert_eq!(n("-3").kind(), NumberKind::Integer);
        assert_eq!(n("2.54").kind(), NumberKind::Decimal);
        assert_eq!(n("6.02e23").kind(), NumberKind::Decimal);
        assert_eq!(n("12d").kind(), NumberKind::Decimal);
        assert_eq!(n("1.20s").kind(), NumberKind::SigFig);
        assert!(Number::parse_literal("twelve").is_err());
    }

    #[test]
    fn test_exact_arithmetic_demotes() {
        let third = n("1").checked_div(&n("3")).unwrap();
        assert_eq!(third.kind(), NumberKind::Rational);
        let one = third.checked_mul(&n("3")).unwrap();
        assert_eq!(one.kind(), NumberKind::Integer);
        assert!(one.is_one());

        let product = n("12").checked_mul(&n("2.54")).unwrap();
        assert_eq!(product.kind(), NumberKind::Decimal);
        assert_eq!(product.to_string(), "30.48");

        let ratio = n("1").checked_div(&n("2.54")).unwrap();
        assert_eq!(ratio.kind(), NumberKind::Rational);
        assert_eq!(ratio.checked_mul(&n("2.54")).unwrap(), n("1"));
    }

    #[test]
    fn test_division_by_zero_is_dne() {
        assert!(n("5").checked_div(&n("0")).unwrap().is_dne());
        assert!(n("0.0").checked_pow(-1).unwrap().is_dne());
        let dne = Number::Dne;
        assert!(dne.checked_add(&n("1")).unwrap().is_dne());
        assert_eq!(Number::Dne, Number::Dne);
        assert_eq!(dne.to_string(), "d.n.e.");
    }

    #[test]
    fn test_sigfig_contagion() {
        let product = n("2.0s").checked_mul(&n("3.14159")).unwrap();
        assert_eq!(product.kind(), NumberKind::SigFig);
        assert_eq!(product.to_string(), "6.3");

        let sum = n("1.25s").checked_add(&n("10.1s")).unwrap();
        assert_eq!(sum.to_string(), "11.4");

        let exact = n("12").checked_mul(&n("1.0s")).unwrap();
        assert_eq!(exact.to_string(), "12");
    }

    #[test]
    fn test_pow() {
        assert_eq!(n("2").checked_pow(10).unwrap(), n("1024"));
        assert_eq!(n("2").checked_pow(-2).unwrap().to_string(), "1/4");
        assert_eq!(n("2.54").checked_pow(3).unwrap().to_string(), "16.387064");
        let root = n("9").checked_pow_number(&n("0.5")).unwrap();
        assert!((root.to_f64().unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_pow10() {
        let shifted = n("5").scale_pow10(3).unwrap();
        assert_eq!(shifted.kind(), NumberKind::Integer);
        assert_eq!(shifted.to_string(), "5000");

        let shifted = n("5").scale_pow10(-2).unwrap();
        assert_eq!(shifted.kind(), NumberKind::Decimal);
        assert_eq!(shifted.to_string(), "0.05");

        let shifted = n("1.5s").scale_pow10(2).unwrap();
        assert_eq!(shifted.to_string(), "150");
    }

    #[test]
    fn test_cross_kind_ordering() {
        assert_eq!(n("1"), n("1.0"));
        assert_eq!(n("1"), n("1.0s"));
        assert!(n("0.5") < n("1"));
        assert!(Number::Dne.partial_cmp(&n("1")).is_none());
    }

    #[test]
    fn test_precision_weight() {
        assert!(n("12").precision_weight() > n("2.54").precision_weight());
        assert!(n("1").checked_div(&n("3")).unwrap().precision_weight() > n("2.54").precision_weight());
        assert_eq!(n("133.322s").precision_weight(), 6.0);
    }
}
