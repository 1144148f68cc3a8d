// src/types/money.rs

//! Whole-cent money. Every price, cash balance and valuation in the crate
//! is a `Cents` value, so "two fractional digits" and "never negative" hold
//! by construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, TradeError};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(pub u64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Builds a value from whole dollars and cents, e.g. `Cents::new(170, 0)`.
    #[inline]
    pub const fn new(dollars: u64, cents: u64) -> Self {
        Cents(dollars * 100 + cents)
    }

    /// `self * quantity`, failing instead of wrapping.
    pub fn checked_times(self, quantity: u64) -> Result<Cents, TradeError> {
        self.0
            .checked_mul(quantity)
            .map(Cents)
            .ok_or(TradeError::ArithmeticOverflow)
    }

    pub fn checked_add(self, rhs: Cents) -> Result<Cents, TradeError> {
        self.0
            .checked_add(rhs.0)
            .map(Cents)
            .ok_or(TradeError::ArithmeticOverflow)
    }

    /// `None` when `rhs` exceeds `self`; callers test affordability first.
    #[inline]
    pub fn checked_sub(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_sub(rhs.0).map(Cents)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Cents {
    type Err = ConfigError;

    /// Accepts `"10000"`, `"170.5"` and `"2800.00"`. Signs, exponents and more
    /// than two fractional digits are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidAmount(s.to_string());
        let trimmed = s.trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let dollars: u64 = whole.parse().map_err(|_| invalid())?;
        let cents: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };
        dollars
            .checked_mul(100)
            .and_then(|d| d.checked_add(cents))
            .map(Cents)
            .ok_or_else(invalid)
    }
}
