// src/simulators/uniform_walk.rs

use super::price_model::PriceModel;
use crate::config::MAX_TICK_CHANGE_PCT;
use crate::types::Cents;
use rand::distributions::Standard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bounded random walk: each tick moves the price by a uniform percentage
/// in `[-MAX_TICK_CHANGE_PCT, +MAX_TICK_CHANGE_PCT)`.
pub struct UniformWalk<R: Rng = StdRng> {
    rng: R,
    max_change_pct: f64,
}

impl UniformWalk<StdRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Same seed, same price path.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> UniformWalk<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            max_change_pct: MAX_TICK_CHANGE_PCT,
        }
    }

    /// Percentage change for one tick, e.g. `-2.5` for a 2.5% drop.
    fn draw_change_pct(&mut self) -> f64 {
        let u: f64 = self.rng.sample(Standard);
        u * (2.0 * self.max_change_pct) - self.max_change_pct
    }
}

impl<R: Rng> PriceModel for UniformWalk<R> {
    fn next_price(&mut self, current: Cents) -> Cents {
        let change_pct = self.draw_change_pct();
        apply_change(current, change_pct)
    }
}

/// `price + price * change_pct / 100`, rounded half-up to the cent.
/// Never returns zero: the smallest listed price is one cent.
pub fn apply_change(price: Cents, change_pct: f64) -> Cents {
    let cents = price.raw() as f64;
    let moved = cents + cents * change_pct / 100.0;
    let rounded = (moved + 0.5).floor();
    Cents((rounded as u64).max(1))
}
