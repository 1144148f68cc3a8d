// src/portfolio/valuation.rs

use super::ledger::Ledger;
use crate::error::ValuationError;
use crate::market::Market;
use crate::stocks::Symbol;
use crate::types::Cents;

/// One position marked at the live market price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingValue {
    pub symbol: Symbol,
    pub quantity: u64,
    pub price: Cents,
    pub value: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valuation {
    pub cash: Cents,
    pub holdings: Vec<HoldingValue>,
    /// Cash plus every holding's value.
    pub total: Cents,
}

impl Ledger {
    /// Marks every non-zero holding to `market`. A holding the market does not
    /// list is reported as an inconsistency rather than skipped.
    pub fn valuation(&self, market: &Market) -> Result<Valuation, ValuationError> {
        let mut total = self.cash();
        let mut holdings = Vec::with_capacity(self.holdings().len());

        for (symbol, &quantity) in self.holdings() {
            if quantity == 0 {
                continue;
            }
            let price = market
                .get_stock(symbol)
                .map(|s| s.price())
                .ok_or_else(|| ValuationError::UnknownSymbol {
                    symbol: symbol.clone(),
                })?;
            let value = price
                .checked_times(quantity)
                .map_err(|_| ValuationError::Overflow)?;
            total = total
                .checked_add(value)
                .map_err(|_| ValuationError::Overflow)?;
            holdings.push(HoldingValue {
                symbol: symbol.clone(),
                quantity,
                price,
                value,
            });
        }

        Ok(Valuation {
            cash: self.cash(),
            holdings,
            total,
        })
    }
}
