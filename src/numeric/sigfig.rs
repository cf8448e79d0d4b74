//! Significant-figures numbers.
//!
//! A [`SigFig`] is a decimal value plus the place of its least significant
//! digit. The place is what carries the precision: `200` has its last
//! significant digit in the hundreds (place 2), `200.` in the units (place 0).

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, MathematicalOps};

use super::errors::{NumericError, NumericResult};

/// Decimal value with a tracked least significant place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigFig {
    value: Decimal,
    /// Power of ten of the least significant digit.
    lsp: i32,
}

// ============================================================================
// Decimal helpers
// ============================================================================

/// `10^exp` as a decimal, when representable.
pub(crate) fn pow10(exp: i32) -> Option<Decimal> {
    if exp >= 0 {
        let v = 10i128.checked_pow(exp as u32)?;
        Decimal::try_from_i128_with_scale(v, 0).ok()
    } else {
        Decimal::try_from_i128_with_scale(1, exp.unsigned_abs()).ok()
    }
}

/// Multiply by `10^exp`.
pub(crate) fn shift(value: Decimal, exp: i32) -> NumericResult<Decimal> {
    let factor = pow10(exp).ok_or(NumericError::Overflow)?;
    value.checked_mul(factor).ok_or(NumericError::Overflow)
}

/// Place of the most significant digit of a non-zero value.
pub(crate) fn most_significant_place(value: Decimal) -> i32 {
    let v = value.abs().normalize();
    let digits = v.mantissa().to_string().len() as i32;
    digits - 1 - v.scale() as i32
}

fn round_to_place(value: Decimal, place: i32) -> NumericResult<Decimal> {
    if place <= 0 {
        return Ok(value.round_dp(place.unsigned_abs()));
    }
    let factor = pow10(place).ok_or(NumericError::Overflow)?;
    let quotient = value.checked_div(factor).ok_or(NumericError::Overflow)?;
    quotient.round().checked_mul(factor).ok_or(NumericError::Overflow)
}

// ============================================================================
// SigFig
// ============================================================================

impl SigFig {
    /// Round `value` to `sigfigs` significant figures.
    pub fn with_sigfigs(value: Decimal, sigfigs: u32) -> NumericResult<Self> {
        let sigfigs = sigfigs.max(1);
        if value.is_zero() {
            return Ok(Self { value: Decimal::ZERO, lsp: 1 - sigfigs as i32 });
        }
        let rounded = value.round_sf(sigfigs).ok_or(NumericError::Overflow)?;
        let lsp = most_significant_place(rounded) - sigfigs as i32 + 1;
        Ok(Self { value: rounded, lsp })
    }

    /// Round `value` so its last significant digit sits at `place`.
    pub fn at_place(value: Decimal, place: i32) -> NumericResult<Self> {
        let rounded = round_to_place(value, place)?;
        Ok(Self { value: rounded, lsp: place })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn least_significant_place(&self) -> i32 {
        self.lsp
    }

    pub fn most_significant_place(&self) -> i32 {
        if self.value.is_zero() {
            self.lsp
        } else {
            most_significant_place(self.value)
        }
    }

    /// Number of significant figures (at least one, even for zero).
    pub fn sigfigs(&self) -> u32 {
        if self.value.is_zero() {
            return 1;
        }
        (most_significant_place(self.value) - self.lsp + 1).max(1) as u32
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Multiply by an exact power of ten; precision moves with the value.
    pub fn shifted(&self, exp: i32) -> NumericResult<Self> {
        Ok(Self { value: shift(self.value, exp)?, lsp: self.lsp + exp })
    }

    pub fn checked_powi(&self, exp: i64) -> NumericResult<Self> {
        let value = self.value.checked_powi(exp).ok_or(NumericError::Overflow)?;
        Self::with_sigfigs(value, self.sigfigs())
    }

    /// Significant digits as text, without sign or decimal point.
    fn digits(&self) -> NumericResult<String> {
        let scaled = shift(self.value.abs(), -self.lsp)?;
        Ok(scaled.round().normalize().to_string())
    }

    fn write_exponent(f: &mut fmt::Formatter<'_>, sign: &str, digits: &str, power: i32) -> fmt::Result {
        let (head, tail) = digits.split_at(1);
        if tail.is_empty() {
            write!(f, "{sign}{head}e{power}")
        } else {
            write!(f, "{sign}{head}.{tail}e{power}")
        }
    }
}

impl FromStr for SigFig {
    type Err = NumericError;

    fn from_str(text: &str) -> NumericResult<Self> {
        let invalid = || NumericError::InvalidLiteral(text.to_string());
        let s = text.trim();
        let (negative, rest) = match s.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (mantissa, exponent) = match rest.find(['e', 'E']) {
            Some(i) => (&rest[..i], rest[i + 1..].parse::<i32>().map_err(|_| invalid())?),
            None => (rest, 0),
        };
        let (int_digits, frac_digits, has_dot) = match mantissa.split_once('.') {
            Some((a, b)) => (a, b, true),
            None => (mantissa, "", false),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (int_digits.is_empty() && frac_digits.is_empty())
            || !all_digits(int_digits)
            || !all_digits(frac_digits)
        {
            return Err(invalid());
        }

        // Trailing integer zeros only count when a decimal point is written.
        let lsp = if has_dot {
            exponent - frac_digits.len() as i32
        } else {
            let trimmed = int_digits.trim_end_matches('0');
            if trimmed.is_empty() {
                exponent
            } else {
                exponent + (int_digits.len() - trimmed.len()) as i32
            }
        };

        let digits = format!("{int_digits}{frac_digits}");
        let mantissa: i128 = digits.parse().map_err(|_| NumericError::Overflow)?;
        let scale = frac_digits.len() as i32 - exponent;
        let mut value = if scale >= 0 {
            Decimal::try_from_i128_with_scale(mantissa, scale as u32)
                .map_err(|_| NumericError::Overflow)?
        } else {
            let base = Decimal::try_from_i128_with_scale(mantissa, 0)
                .map_err(|_| NumericError::Overflow)?;
            shift(base, -scale)?
        };
        if negative {
            value = -value;
        }
        Ok(Self { value, lsp })
    }
}

impl fmt::Display for SigFig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_zero() {
            return if self.lsp < 0 {
                write!(f, "0.{}", "0".repeat(self.lsp.unsigned_abs() as usize))
            } else {
                write!(f, "0")
            };
        }
        let sign = if self.value.is_sign_negative() { "-" } else { "" };
        let digits = self.digits().map_err(|_| fmt::Error)?;
        let sigfigs = digits.len() as i32;
        let power = self.lsp + sigfigs - 1;

        if power.abs() > sigfigs.max(3) {
            return Self::write_exponent(f, sign, &digits, power);
        }

        if sigfigs > power {
            // "10." would read as an integer; use exponent form instead
            if power > 0 && sigfigs == power + 1 && digits.ends_with('0') {
                return Self::write_exponent(f, sign, &digits, power);
            }
            if power >= 0 {
                let split = (power + 1) as usize;
                if split < digits.len() {
                    let (int_part, frac_part) = digits.split_at(split);
                    write!(f, "{sign}{int_part}.{frac_part}")
                } else {
                    write!(f, "{sign}{digits}")
                }
            } else {
                let zeros = "0".repeat((-1 - power) as usize);
                write!(f, "{sign}0.{zeros}{digits}")
            }
        } else {
            if digits.ends_with('0') {
                return Self::write_exponent(f, sign, &digits, power);
            }
            let zeros = "0".repeat(self.lsp as usize);
            write!(f, "{sign}{digits}{zeros}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sf(s: &str) -> SigFig {
        s.parse().unwrap()
    }

    #[test]
    fn test_sigfig_counts() {
        let cases = [
            ("1", 1), ("10", 1), ("10.", 2), ("23", 2), ("230", 2), ("7400", 2),
            ("6000", 1), ("532", 3), ("45.", 2), ("45.0", 3), ("45.00", 4),
            ("45.005", 5), ("45.05", 4), ("45.050", 5), ("2030", 3), ("20300", 3),
            ("20300.", 5), ("20300.0", 6), ("1e0", 1), ("1.0e0", 2), ("2e7", 1),
            ("2.5e3", 2), ("8.700e8", 4), ("3.23e4", 3), ("2.00e-6", 3),
        ];
        for (text, n) in cases {
            assert_eq!(sf(text).sigfigs(), n, "{text}");
            assert_eq!(sf(&format!("-{text}")).sigfigs(), n, "-{text}");
        }
    }

    #[test]
    fn test_place_and_text() {
        let cases = [
            ("1", 1, 0, "1"), ("6.", 1, 0, "6"), ("6.0", 2, -1, "6.0"),
            ("6.07", 3, -2, "6.07"), ("0.07", 1, -2, "0.07"), (".07", 1, -2, "0.07"),
            ("7e-2", 1, -2, "0.07"), ("0.0340", 3, -4, "0.0340"), ("3.4e-4", 2, -5, "3.4e-4"),
            ("3.40e-4", 3, -6, "3.40e-4"), ("10", 1, 1, "10"), ("1.0e1", 2, 0, "1.0e1"),
            ("10.", 2, 0, "1.0e1"), ("200", 1, 2, "200"), ("200.", 3, 0, "2.00e2"),
            ("2.0e2", 2, 1, "2.0e2"), ("0", 1, 0, "0"), ("0.0", 1, -1, "0.0"),
            ("185", 3, 0, "185"), ("73.30", 4, -2, "73.30"), ("-2.7", 2, -1, "-2.7"),
        ];
        for (text, sigfigs, lsp, rendered) in cases {
            let s = sf(text);
            assert_eq!(s.sigfigs(), sigfigs, "{text}");
            assert_eq!(s.least_significant_place(), lsp, "{text}");
            assert_eq!(s.to_string(), rendered, "{text}");
        }
    }

    #[test]
    fn test_round_to_sigfigs() {
        let s = SigFig::with_sigfigs(Decimal::new(9996, 3), 3).unwrap();
        assert_eq!(s.value(), Decimal::new(100, 1));
        assert_eq!(s.sigfigs(), 3);
        assert_eq!(s.to_string(), "10.0");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("".parse::<SigFig>().is_err());
        assert!("1.2.3".parse::<SigFig>().is_err());
        assert!("1e".parse::<SigFig>().is_err());
        assert!("abc".parse::<SigFig>().is_err());
    }
}
