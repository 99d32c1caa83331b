//! Exact-precision decimal numbers carried as canonical text.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CodecError;

/// Significant decimal digits kept when a binary float becomes a [`Number`].
///
/// Fifteen digits is the most an `f64` round-trips through decimal text, so
/// float noise such as `0.1 + 0.2 == 0.30000000000000004` rounds away.
pub const F64_SIGNIFICANT_DIGITS: usize = 15;

// Exponents beyond this cannot be stored by the remote store anyway.
const MAX_EXPONENT: i64 = 400;

/// Decimal number stored as canonical text.
///
/// ## Invariants
/// - No exponent, no leading zeros in the integer part, no trailing zeros in
///   the fraction, no `+` sign.
/// - Zero is always `0`; a `-` prefix only appears on non-zero values.
///
/// Equal numbers therefore have equal text, and `decode(encode(n)) == n`.
///
/// # Examples
/// ```
/// use lottery_backend::domain::attribute::Number;
///
/// let n: Number = "012.500".parse().expect("valid decimal");
/// assert_eq!(n.as_str(), "12.5");
/// assert_eq!(Number::try_from(0.1 + 0.2).expect("finite"), "0.3".parse().expect("valid"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Number(String);

impl Number {
    /// Canonical decimal text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Integer value when the number is integral and fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Unsigned integer value when the number is integral, non-negative and fits.
    pub fn to_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Nearest `f64`, when finite.
    pub fn to_f64(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|value| value.is_finite())
    }

    fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }

    fn magnitude(&self) -> &str {
        self.0.strip_prefix('-').unwrap_or(&self.0)
    }
}

fn canonicalize(raw: &str) -> Option<String> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    if exponent.abs() > MAX_EXPONENT {
        return None;
    }
    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    // `point` is the position of the decimal point within `digits`.
    let digits = format!("{integer}{fraction}");
    let mut point = i64::try_from(integer.len()).ok()? + exponent;
    let trimmed_leading = digits.trim_start_matches('0');
    point -= i64::try_from(digits.len() - trimmed_leading.len()).ok()?;
    let significant = trimmed_leading.trim_end_matches('0');
    if significant.is_empty() {
        return Some("0".to_owned());
    }

    let length = i64::try_from(significant.len()).ok()?;
    let body = if point <= 0 {
        let zeros = usize::try_from(-point).ok()?;
        format!("0.{}{significant}", "0".repeat(zeros))
    } else if point >= length {
        let zeros = usize::try_from(point - length).ok()?;
        format!("{significant}{}", "0".repeat(zeros))
    } else {
        let split = usize::try_from(point).ok()?;
        let (whole, part) = significant.split_at(split);
        format!("{whole}.{part}")
    };
    Some(if negative { format!("-{body}") } else { body })
}

fn compare_magnitude(left: &str, right: &str) -> Ordering {
    let (left_int, left_frac) = left.split_once('.').unwrap_or((left, ""));
    let (right_int, right_frac) = right.split_once('.').unwrap_or((right, ""));
    left_int
        .len()
        .cmp(&right_int.len())
        .then_with(|| left_int.cmp(right_int))
        .then_with(|| left_frac.cmp(right_frac))
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => compare_magnitude(self.magnitude(), other.magnitude()),
            (true, true) => compare_magnitude(other.magnitude(), self.magnitude()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Number {
    type Err = CodecError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        canonicalize(raw).map(Self).ok_or_else(|| {
            CodecError::malformed_wire_value(format!("`{raw}` is not a decimal number"))
        })
    }
}

impl TryFrom<String> for Number {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Number> for String {
    fn from(value: Number) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Number {
    type Error = CodecError;

    /// Round to [`F64_SIGNIFICANT_DIGITS`] significant digits.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(CodecError::unsupported_type(format!("non-finite f64 ({value})")));
        }
        let scientific = format!("{value:.precision$e}", precision = F64_SIGNIFICANT_DIGITS - 1);
        scientific.parse()
    }
}

macro_rules! number_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

number_from_integer!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, usize, isize);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn number(raw: &str) -> Number {
        raw.parse().expect("valid decimal")
    }

    #[rstest]
    #[case("0", "0")]
    #[case("-0", "0")]
    #[case("+7", "7")]
    #[case("007", "7")]
    #[case("12.500", "12.5")]
    #[case(".5", "0.5")]
    #[case("5.", "5")]
    #[case("1e3", "1000")]
    #[case("1.25E-3", "0.00125")]
    #[case("-4.2e1", "-42")]
    #[case("0.000", "0")]
    fn canonical_text(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(number(raw).as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("-")]
    #[case(".")]
    #[case("1.2.3")]
    #[case("12a")]
    #[case("1e")]
    #[case("1e999")]
    #[case(" 1")]
    fn rejects_non_decimal_text(#[case] raw: &str) {
        let err = raw.parse::<Number>().expect_err("invalid decimal rejected");
        assert!(matches!(err, CodecError::MalformedWireValue { .. }));
    }

    #[rstest]
    fn float_noise_rounds_to_declared_precision() {
        assert_eq!(Number::try_from(0.1 + 0.2).expect("finite"), number("0.3"));
        assert_eq!(
            Number::try_from(1.0 / 3.0).expect("finite").as_str(),
            "0.333333333333333"
        );
    }

    #[rstest]
    fn large_floats_have_no_exponent() {
        assert_eq!(
            Number::try_from(1.5e20).expect("finite").as_str(),
            "150000000000000000000"
        );
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn non_finite_floats_are_unsupported(#[case] value: f64) {
        let err = Number::try_from(value).expect_err("non-finite rejected");
        assert!(matches!(err, CodecError::UnsupportedType { .. }));
    }

    #[rstest]
    fn integers_convert_exactly() {
        assert_eq!(Number::from(u64::MAX).to_u64(), Some(u64::MAX));
        assert_eq!(Number::from(-17_i32).to_i64(), Some(-17));
        assert_eq!(number("2.5").to_i64(), None);
    }

    #[rstest]
    fn ordering_is_numeric() {
        let mut values: Vec<Number> = ["10", "-2.5", "0.25", "9", "-10", "0.3"]
            .into_iter()
            .map(number)
            .collect();
        values.sort();
        let text: Vec<_> = values.iter().map(Number::as_str).collect();
        assert_eq!(text, ["-10", "-2.5", "0.25", "0.3", "9", "10"]);
    }
}
