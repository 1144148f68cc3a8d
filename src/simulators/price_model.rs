// src/simulators/price_model.rs

use crate::types::Cents;

/// Anything that can move a price by one tick.
/// This keeps the random walk pluggable, and deterministic under test.
pub trait PriceModel {
    /// Draws the next price for a stock currently trading at `current`.
    fn next_price(&mut self, current: Cents) -> Cents;
}

impl<M: PriceModel + ?Sized> PriceModel for &mut M {
    fn next_price(&mut self, current: Cents) -> Cents {
        (**self).next_price(current)
    }
}

impl<M: PriceModel + ?Sized> PriceModel for Box<M> {
    fn next_price(&mut self, current: Cents) -> Cents {
        (**self).next_price(current)
    }
}
