// src/stocks/definitions.rs
//! Listed stock metadata.
//
//! The seed catalog lives in `default_stock_universe()`. A config file can
//! replace it with its own `[[stocks]]` entries.

pub type Symbol = String;

use crate::types::Cents;

/// A listed company. Symbol and name are fixed at listing; only the market
/// moves the price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stock {
    symbol: Symbol,
    name: String,
    price: Cents,
}

impl Stock {
    #[inline]
    pub fn new<T1: Into<String>, T2: Into<String>>(symbol: T1, name: T2, price: Cents) -> Self {
        Self {
            symbol: normalize_symbol(&symbol.into()),
            name: name.into(),
            price,
        }
    }

    /// Exchange ticker, always upper-case (e.g. "AAPL").
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Cents {
        self.price
    }

    pub(crate) fn set_price(&mut self, price: Cents) {
        self.price = price;
    }
}

impl std::fmt::Display for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {} | ${}", self.symbol, self.name, self.price)
    }
}

/// Catalog keys are upper-case with no surrounding whitespace.
#[inline]
pub fn normalize_symbol(raw: &str) -> Symbol {
    raw.trim().to_uppercase()
}

/// The universe of stocks available when the market boots.
#[inline]
pub fn default_stock_universe() -> Vec<Stock> {
    vec![
        Stock::new("AAPL", "Apple Inc.", Cents::new(170, 0)),
        Stock::new("GOOG", "Alphabet Inc.", Cents::new(2800, 0)),
        Stock::new("TSLA", "Tesla Inc.", Cents::new(720, 0)),
        Stock::new("AMZN", "Amazon.com Inc.", Cents::new(3400, 0)),
    ]
}
