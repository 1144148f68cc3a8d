// src/portfolio/mod.rs

pub mod clock;
pub mod ledger;
pub mod valuation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ledger::Ledger;
pub use valuation::{HoldingValue, Valuation};
