// src/market.rs

use crate::error::MarketError;
use crate::simulators::PriceModel;
use crate::stocks::{Stock, Symbol, normalize_symbol};
use crate::types::Cents;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use tracing::{debug, trace};

/// A market the session and a background ticker can both reach.
pub type SharedMarket = Arc<RwLock<Market>>;

/// The catalog of tradable stocks. The set of symbols is fixed at
/// construction; ticks only move prices.
#[derive(Debug, Clone)]
pub struct Market {
    stocks: BTreeMap<Symbol, Stock>,
    ticks: u64,
}

impl Market {
    pub fn new(stocks: impl IntoIterator<Item = Stock>) -> Result<Self, MarketError> {
        let mut catalog = BTreeMap::new();
        for stock in stocks {
            if stock.symbol().is_empty() {
                return Err(MarketError::EmptySymbol);
            }
            if stock.price() == Cents::ZERO {
                return Err(MarketError::NonPositivePrice(stock.symbol().to_string()));
            }
            match catalog.entry(stock.symbol().to_string()) {
                Entry::Occupied(e) => return Err(MarketError::DuplicateSymbol(e.key().clone())),
                Entry::Vacant(e) => {
                    e.insert(stock);
                }
            }
        }
        Ok(Self {
            stocks: catalog,
            ticks: 0,
        })
    }

    pub fn into_shared(self) -> SharedMarket {
        Arc::new(RwLock::new(self))
    }

    /// One tick: every stock gets an independent draw from `model`.
    pub fn update_prices<M: PriceModel + ?Sized>(&mut self, model: &mut M) {
        for stock in self.stocks.values_mut() {
            let old = stock.price();
            let new = model.next_price(old);
            trace!(symbol = stock.symbol(), %old, %new, "price tick");
            stock.set_price(new);
        }
        self.ticks += 1;
        debug!(tick = self.ticks, stocks = self.stocks.len(), "market ticked");
    }

    /// Case-insensitive lookup by catalog key.
    pub fn get_stock(&self, symbol: &str) -> Option<&Stock> {
        self.stocks.get(&normalize_symbol(symbol))
    }

    pub fn price_of(&self, symbol: &str) -> Result<Cents, MarketError> {
        self.get_stock(symbol)
            .map(Stock::price)
            .ok_or_else(|| MarketError::UnknownSymbol(normalize_symbol(symbol)))
    }

    /// All listings in symbol order.
    pub fn stocks(&self) -> impl Iterator<Item = &Stock> {
        self.stocks.values()
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// Number of ticks applied since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for Market {
    fn default() -> Self {
        Self {
            stocks: crate::stocks::default_stock_universe()
                .into_iter()
                .map(|s| (s.symbol().to_string(), s))
                .collect(),
            ticks: 0,
        }
    }
}
