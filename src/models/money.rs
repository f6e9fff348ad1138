//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) so that shares and running
//! payment totals never accumulate binary floating-point error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Represents a monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use chorebook::models::Money;
    /// let amount = Money::from_cents(1050); // $10.50
    /// assert_eq!(amount.cents(), 1050);
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole units
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Subtract, flooring the result at zero
    pub fn saturating_sub_floor(self, other: Self) -> Self {
        Self((self.0 - other.0).max(0))
    }

    /// Divide into `parts` equal portions, rounding half away from zero
    ///
    /// Returns `None` when `parts` is zero.
    ///
    /// ```
    /// use chorebook::models::Money;
    /// assert_eq!(Money::from_cents(10000).divide_rounded(3), Some(Money::from_cents(3333)));
    /// assert_eq!(Money::from_cents(200).divide_rounded(3), Some(Money::from_cents(67)));
    /// ```
    pub fn divide_rounded(&self, parts: usize) -> Option<Self> {
        if parts == 0 {
            return None;
        }
        let n = parts as i128;
        let value = i128::from(self.0);
        let magnitude = (2 * value.abs() + n) / (2 * n);
        let rounded = if value < 0 { -magnitude } else { magnitude };
        i64::try_from(rounded).ok().map(Self)
    }

    /// Allocate the amount into `parts` portions that sum exactly to the whole
    ///
    /// Every portion receives the floor share; the leftover cents go one each
    /// to the first portions. Returns `None` when `parts` is zero.
    pub fn allocate(&self, parts: usize) -> Option<Vec<Self>> {
        if parts == 0 {
            return None;
        }
        let n = parts as i64;
        let base = self.0.div_euclid(n);
        let remainder = self.0.rem_euclid(n) as usize;
        Some(
            (0..parts)
                .map(|i| Self(if i < remainder { base + 1 } else { base }))
                .collect(),
        )
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "$10.50", "10". A single leading
    /// minus is the only sign allowed.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();

        let (negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, s)
        };

        let s = s.strip_prefix('$').unwrap_or(s);

        let invalid = || MoneyParseError::InvalidFormat(s.to_string());
        let out_of_range = || MoneyParseError::OutOfRange(s.to_string());

        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(invalid());
        }

        let (units, fraction) = s.split_once('.').unwrap_or((s, ""));
        if fraction.contains('.') {
            return Err(invalid());
        }

        let units: i64 = if units.is_empty() {
            0
        } else {
            units.parse().map_err(|_| out_of_range())?
        };

        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            2 => fraction.parse().map_err(|_| invalid())?,
            _ => return Err(MoneyParseError::TooPrecise(s.to_string())),
        };

        let total = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .ok_or_else(out_of_range)?;

        Ok(Self(if negative { -total } else { total }))
    }

    /// Plain decimal form without a currency symbol ("10.50")
    pub fn to_decimal_string(&self) -> String {
        if self.is_negative() {
            format!("-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            format!("{}.{:02}", self.units(), self.cents_part())
        }
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}{}.{:02}", symbol, self.units().abs(), self.cents_part())
        } else {
            format!("{}{}.{:02}", symbol, self.units(), self.cents_part())
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    TooPrecise(String),
    OutOfRange(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::TooPrecise(s) => {
                write!(f, "Amounts are limited to two decimal places: {}", s)
            }
            MoneyParseError::OutOfRange(s) => write!(f, "Amount is too large: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}
