// src/types/transaction.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Cents;
use crate::stocks::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

/// One executed trade. Only the ledger creates these, and never edits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub side: Side,
    pub symbol: Symbol,
    pub quantity: u64,
    /// Unit price at execution time.
    pub price: Cents,
    pub executed_at: DateTime<Utc>,
}

impl Transaction {
    /// Total cash moved by this trade.
    pub fn notional(&self) -> Option<Cents> {
        self.price.0.checked_mul(self.quantity).map(Cents)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | Qty: {} | Price: ${}",
            self.executed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.side,
            self.symbol,
            self.quantity,
            self.price
        )
    }
}
