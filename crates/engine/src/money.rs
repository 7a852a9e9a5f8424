use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency label appended when an amount is displayed.
pub const CURRENCY_LABEL: &str = "CUP";

/// Signed money amount represented as **integer cents**.
///
/// Every stored amount (entries, prices, budget limits) uses this type so
/// balances are exact sums and never drift the way floats would.
///
/// The operators saturate at the `i64` bounds instead of wrapping. Code that
/// must refuse an overflow (recording an entry) uses [`MoneyCents::checked_add`].
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34 CUP");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals and anything that is not a plain number):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// assert!("NaN".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns the amount in major units as a float, for ratios only.
    #[must_use]
    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `100 × self / limit`, without clamping. `None` when `limit` is not positive.
    #[must_use]
    pub fn percent_of(self, limit: MoneyCents) -> Option<f64> {
        limit
            .is_positive()
            .then(|| self.0 as f64 * 100.0 / limit.0 as f64)
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Clamps a wide intermediate sum back into range.
    pub(crate) fn from_wide(cents: i128) -> Self {
        Self(cents.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }

    /// Parses user input and requires the result to be strictly positive.
    pub fn parse_positive(input: &str) -> Result<MoneyCents, EngineError> {
        let amount: MoneyCents = input.parse()?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be greater than zero, got {amount}"
            )));
        }
        Ok(amount)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02} {CURRENCY_LABEL}", abs / 100, abs % 100)
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MoneyCents> for MoneyCents {
    fn sum<I: Iterator<Item = &'a MoneyCents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// At most 2 fractional digits; only ASCII digits otherwise, so `NaN`,
    /// `inf` and exponents are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EngineError::InvalidAmount(format!("{reason}: '{}'", s.trim()));

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        if rest.is_empty() {
            return Err(invalid("empty amount"));
        }

        let normalized = rest.replace(',', ".");
        let (units, fraction) = match normalized.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (normalized.as_str(), ""),
        };

        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if units.is_empty() || !digits_only(units) || !digits_only(fraction) {
            return Err(invalid("not a number"));
        }
        if fraction.len() > 2 {
            return Err(invalid("too many decimals"));
        }

        let units: i64 = units.parse().map_err(|_| invalid("amount too large"))?;
        let cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
            _ => fraction.parse::<i64>().map_err(|_| invalid("not a number"))?,
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_appends_currency() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00 CUP");
        assert_eq!(MoneyCents::new(5).to_string(), "0.05 CUP");
        assert_eq!(MoneyCents::new(7050).to_string(), "70.50 CUP");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50 CUP");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("50".parse::<MoneyCents>().unwrap().cents(), 5000);
        assert_eq!("75.5".parse::<MoneyCents>().unwrap().cents(), 7550);
        assert_eq!("75,50".parse::<MoneyCents>().unwrap().cents(), 7550);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("10.".parse::<MoneyCents>().unwrap().cents(), 1000);
    }

    #[test]
    fn parse_rejects_non_numbers() {
        for input in ["", "abc", "NaN", "inf", "1e3", "12.345", "1.2.3", ".5", "+", "9999999999999999999"] {
            assert!(input.parse::<MoneyCents>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn parse_positive_rejects_zero_and_negative() {
        assert!(matches!(
            MoneyCents::parse_positive("0"),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            MoneyCents::parse_positive("-5"),
            Err(EngineError::InvalidAmount(_))
        ));
        assert_eq!(MoneyCents::parse_positive("0.01").unwrap().cents(), 1);
    }

    #[test]
    fn operators_saturate_instead_of_wrapping() {
        let max = MoneyCents::new(i64::MAX);
        assert_eq!(max + MoneyCents::new(1), max);
        assert_eq!(MoneyCents::new(i64::MIN) - MoneyCents::new(1), MoneyCents::new(i64::MIN));
        assert_eq!([max, max].iter().sum::<MoneyCents>(), max);
        assert_eq!(max.checked_add(MoneyCents::new(1)), None);
        assert_eq!(MoneyCents::from_wide(i128::from(i64::MAX) * 2), max);
    }

    #[test]
    fn percent_is_not_clamped() {
        let spent = MoneyCents::new(15_000);
        assert_eq!(spent.percent_of(MoneyCents::new(10_000)), Some(150.0));
        assert_eq!(spent.percent_of(MoneyCents::ZERO), None);
    }
}
