//! Fixed-point money and percentage types.
//!
//! Amounts are held as integer paise and rates as integer basis points, so
//! every stored figure is exact to two decimal places and arithmetic never
//! drifts. Both types are `SeaORM` value types and map to `BIGINT` columns.

use sea_orm::DeriveValueType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Paise per rupee, and basis points per percent.
const HUNDREDTHS: i64 = 100;
/// Basis points in 100%.
const FULL_BASIS_POINTS: i64 = 10_000;

/// A monetary amount in paise (1 rupee = 100 paise).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveValueType,
    Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    /// Zero rupees.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from paise.
    #[must_use]
    pub const fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    /// Creates an amount from whole rupees.
    #[must_use]
    pub const fn from_rupees(rupees: i64) -> Self {
        Self(rupees * HUNDREDTHS)
    }

    /// The amount in paise.
    #[must_use]
    pub const fn paise(self) -> i64 {
        self.0
    }

    /// Whole-rupee part (truncated toward zero).
    #[must_use]
    pub const fn rupees_part(self) -> i64 {
        self.0 / HUNDREDTHS
    }

    /// Paise part, always in `0..100` for non-negative amounts.
    #[must_use]
    pub const fn paise_part(self) -> i64 {
        self.0 % HUNDREDTHS
    }

    /// True when the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Larger of the two amounts.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    /// `rate` of this amount, rounded half away from zero to the paise.
    #[must_use]
    pub fn percent_of(self, rate: Percent) -> Self {
        let scaled = i128::from(self.0) * i128::from(rate.0);
        Self(div_round(scaled, i128::from(FULL_BASIS_POINTS)))
    }

    /// Divides by a whole number, rounded half away from zero.
    #[must_use]
    pub fn divide_by(self, divisor: i64) -> Self {
        if divisor == 0 {
            return Self::ZERO;
        }
        Self(div_round(i128::from(self.0), i128::from(divisor)))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}₹{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s)
            .map(Self)
            .ok_or_else(|| format!("'{s}' is not an amount with at most two decimals"))
    }
}

impl TryFrom<String> for Money {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        let sign = if value.0 < 0 { "-" } else { "" };
        let abs = value.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// A percentage in basis points (1% = 100, 100% = 10 000).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveValueType,
    Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Percent(i64);

impl Percent {
    /// 0%.
    pub const ZERO: Self = Self(0);
    /// 100%.
    pub const FULL: Self = Self(FULL_BASIS_POINTS);

    /// Creates a rate from basis points.
    #[must_use]
    pub const fn from_basis_points(bps: i64) -> Self {
        Self(bps)
    }

    /// Creates a rate from a whole percentage, e.g. `18` for 18%.
    #[must_use]
    pub const fn from_whole(percent: i64) -> Self {
        Self(percent * HUNDREDTHS)
    }

    /// The rate in basis points.
    #[must_use]
    pub const fn basis_points(self) -> i64 {
        self.0
    }

    /// Half the rate, as printed for CGST. Odd basis points round down; the
    /// remaining basis point goes to SGST.
    #[must_use]
    pub const fn half(self) -> Self {
        Self(self.0 / 2)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", String::from(*self))
    }
}

impl FromStr for Percent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s.trim_end_matches('%'))
            .map(Self)
            .ok_or_else(|| format!("'{s}' is not a percentage with at most two decimals"))
    }
}

impl TryFrom<String> for Percent {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Percent> for String {
    fn from(value: Percent) -> Self {
        let sign = if value.0 < 0 { "-" } else { "" };
        let abs = value.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Integer division rounding half away from zero.
pub(crate) fn div_round(numerator: i128, denominator: i128) -> i64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let rounded = if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) == (denominator < 0) {
            quotient + 1
        } else {
            quotient - 1
        }
    } else {
        quotient
    };
    i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX })
}

/// Parses `"12"`, `"12.5"` or `"-12.50"` into hundredths.
fn parse_hundredths(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = s
        .strip_prefix('-')
        .map_or((false, s), |rest| (true, rest));
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() || fraction.len() > 2 {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    let value = whole.checked_mul(HUNDREDTHS)?.checked_add(fraction)?;
    Some(if negative { -value } else { value })
}
