use crate::types::errors::MonetaryError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de, Deserialize, Deserializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DECIMAL_PLACES: u32 = 4;
const SCALE: i64 = 10i64.pow(DECIMAL_PLACES);

/// A monetary value stored as a whole number of minor units (1/10_000).
///
/// All arithmetic is checked, callers decide what an overflow means.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Monetary(i64);

impl Monetary {
    pub const ZERO: Monetary = Monetary(0);

    pub const fn from_minor_units(units: i64) -> Self {
        Monetary(units)
    }

    /// Converts a floating point boundary value, rounding half away from zero
    /// to four decimal places.
    pub fn from_f64(value: f64) -> Result<Self, MonetaryError> {
        if !value.is_finite() {
            return Err(MonetaryError::NotFinite);
        }

        let decimal = Decimal::from_f64(value).ok_or(MonetaryError::Overflow)?;

        Monetary::try_from(decimal)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Monetary) -> Option<Monetary> {
        self.0.checked_add(rhs.0).map(Monetary)
    }

    pub fn checked_sub(self, rhs: Monetary) -> Option<Monetary> {
        self.0.checked_sub(rhs.0).map(Monetary)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, DECIMAL_PLACES)
    }
}

impl TryFrom<Decimal> for Monetary {
    type Error = MonetaryError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        value
            .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::from(SCALE))
            .and_then(|scaled| scaled.to_i64())
            .map(Monetary)
            .ok_or(MonetaryError::Overflow)
    }
}

impl Display for Monetary {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.to_decimal())
    }
}

impl FromStr for Monetary {
    type Err = MonetaryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(MonetaryError::InvalidFormat("Value is an empty string".to_string()));
        }

        let decimal = Decimal::from_str(value).map_err(|error| {
            MonetaryError::InvalidFormat(format!("Value '{value}' is not a decimal number: {error}"))
        })?;

        if decimal.scale() > DECIMAL_PLACES {
            return Err(MonetaryError::InvalidFormat("Value has too many decimal places".to_string()));
        }

        Monetary::try_from(decimal)
    }
}

impl<'de> Deserialize<'de> for Monetary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Monetary::from_str(&value).map_err(de::Error::custom)
    }
}
