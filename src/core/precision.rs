use crate::core::error::{Result, SimulationError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a value is rounded when it has more significant digits than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Ties round away from zero (1.5 -> 2, -1.5 -> -2).
    #[default]
    HalfUp,
    /// Ties round to the even neighbour (banker's rounding).
    HalfEven,
    /// Truncate towards zero.
    Down,
    /// Round away from zero.
    Up,
}

impl Rounding {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Rounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Rounding::HalfEven => RoundingStrategy::MidpointNearestEven,
            Rounding::Down => RoundingStrategy::ToZero,
            Rounding::Up => RoundingStrategy::AwayFromZero,
        }
    }
}

/// Decimal precision applied to every ledger multiplication, addition and
/// subtraction.
///
/// Precision is counted in significant digits, not decimal places, so a
/// balance of `1234.5678` and one of `0.012345678` both keep the same number
/// of meaningful digits. Identical inputs and precision always give identical
/// results.
///
/// # Examples
///
/// ```
/// use repayment_engine::core::precision::{Precision, Rounding};
/// use rust_decimal_macros::dec;
///
/// let precision = Precision::new(4, Rounding::HalfUp).unwrap();
/// assert_eq!(precision.round(dec!(12.345)), dec!(12.35));
/// assert_eq!(precision.mul(dec!(500), dec!(0.025)), Some(dec!(12.5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    digits: u32,
    #[serde(default)]
    rounding: Rounding,
}

impl Precision {
    /// Largest precision a `Decimal` mantissa can hold.
    pub const MAX_DIGITS: u32 = 28;

    pub fn new(digits: u32, rounding: Rounding) -> Result<Self> {
        let precision = Self { digits, rounding };
        precision.validate()?;
        Ok(precision)
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Check the digit count, e.g. after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.digits == 0 || self.digits > Self::MAX_DIGITS {
            return Err(SimulationError::invalid(format!(
                "precision must be between 1 and {} significant digits, got {}",
                Self::MAX_DIGITS,
                self.digits
            )));
        }
        Ok(())
    }

    /// Round `value` to this precision.
    pub fn round(&self, value: Decimal) -> Decimal {
        if value.is_zero() {
            return value;
        }
        value
            .round_sf_with_strategy(self.digits, self.rounding.strategy())
            .unwrap_or(value)
    }

    /// `a * b` rounded, or `None` on overflow.
    pub fn mul(&self, a: Decimal, b: Decimal) -> Option<Decimal> {
        a.checked_mul(b).map(|v| self.round(v))
    }

    /// `a + b` rounded, or `None` on overflow.
    pub fn add(&self, a: Decimal, b: Decimal) -> Option<Decimal> {
        a.checked_add(b).map(|v| self.round(v))
    }

    /// `a - b` rounded, or `None` on overflow.
    pub fn sub(&self, a: Decimal, b: Decimal) -> Option<Decimal> {
        a.checked_sub(b).map(|v| self.round(v))
    }
}

impl Default for Precision {
    /// Ten significant digits, half-up.
    fn default() -> Self {
        Self {
            digits: 10,
            rounding: Rounding::HalfUp,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} significant digits ({:?})", self.digits, self.rounding)
    }
}

/// Round to cents, half-up, for reports.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Exact sum, or `None` once the running total leaves the decimal range.
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}
