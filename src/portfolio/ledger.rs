// src/portfolio/ledger.rs

use super::clock::Clock;
use crate::config::DEFAULT_STARTING_CASH;
use crate::error::TradeError;
use crate::stocks::{Stock, Symbol};
use crate::types::{Cents, Side, Transaction};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One user's cash, holdings and append-only trade history.
///
/// Every trade is check-then-commit: all validation happens before the first
/// field is touched, so a refused trade leaves the ledger exactly as it was.
/// A symbol sold down to zero is removed from `holdings`; absent means zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    username: String,
    cash: Cents,
    holdings: BTreeMap<Symbol, u64>,
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(username: impl Into<String>, starting_cash: Cents) -> Self {
        Self {
            username: username.into(),
            cash: starting_cash,
            holdings: BTreeMap::new(),
            transactions: Vec::new(),
        }
    }

    /// A new user with the default starting balance.
    pub fn fresh(username: impl Into<String>) -> Self {
        Self::new(username, DEFAULT_STARTING_CASH)
    }

    /// Reassembles a ledger that was already validated by the file decoder.
    pub(crate) fn from_parts(
        username: String,
        cash: Cents,
        holdings: BTreeMap<Symbol, u64>,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            username,
            cash,
            holdings,
            transactions,
        }
    }

    pub fn buy<C: Clock + ?Sized>(
        &mut self,
        stock: &Stock,
        quantity: u64,
        clock: &C,
    ) -> Result<Transaction, TradeError> {
        if quantity == 0 {
            return Err(TradeError::InvalidQuantity);
        }
        let cost = stock.price().checked_times(quantity)?;
        let Some(remaining) = self.cash.checked_sub(cost) else {
            debug!(symbol = stock.symbol(), quantity, %cost, cash = %self.cash, "buy refused");
            return Err(TradeError::InsufficientFunds {
                needed: cost,
                available: self.cash,
            });
        };
        let held = self.holding(stock.symbol());
        let new_held = held
            .checked_add(quantity)
            .ok_or(TradeError::ArithmeticOverflow)?;

        // commit
        self.cash = remaining;
        self.holdings.insert(stock.symbol().to_string(), new_held);
        Ok(self.record(Side::Buy, stock, quantity, clock))
    }

    pub fn sell<C: Clock + ?Sized>(
        &mut self,
        stock: &Stock,
        quantity: u64,
        clock: &C,
    ) -> Result<Transaction, TradeError> {
        if quantity == 0 {
            return Err(TradeError::InvalidQuantity);
        }
        let owned = self.holding(stock.symbol());
        if owned < quantity {
            debug!(symbol = stock.symbol(), quantity, owned, "sell refused");
            return Err(TradeError::InsufficientHoldings {
                symbol: stock.symbol().to_string(),
                requested: quantity,
                owned,
            });
        }
        let proceeds = stock.price().checked_times(quantity)?;
        let new_cash = self.cash.checked_add(proceeds)?;

        // commit
        self.cash = new_cash;
        let left = owned - quantity;
        if left == 0 {
            self.holdings.remove(stock.symbol());
        } else {
            self.holdings.insert(stock.symbol().to_string(), left);
        }
        Ok(self.record(Side::Sell, stock, quantity, clock))
    }

    fn record<C: Clock + ?Sized>(
        &mut self,
        side: Side,
        stock: &Stock,
        quantity: u64,
        clock: &C,
    ) -> Transaction {
        let tx = Transaction {
            side,
            symbol: stock.symbol().to_string(),
            quantity,
            price: stock.price(),
            executed_at: clock.now(),
        };
        info!(
            user = %self.username,
            %side,
            symbol = %tx.symbol,
            quantity,
            price = %tx.price,
            cash = %self.cash,
            "trade executed"
        );
        self.transactions.push(tx.clone());
        tx
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn cash(&self) -> Cents {
        self.cash
    }

    /// Shares held of `symbol`, zero when none.
    pub fn holding(&self, symbol: &str) -> u64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    /// Non-zero positions in symbol order.
    pub fn holdings(&self) -> &BTreeMap<Symbol, u64> {
        &self.holdings
    }

    /// Trade history, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}
