// src/lib.rs

// === 1. Declare all the top-level modules ===
pub mod config;
pub mod error;
pub mod market;
pub mod persistence;
pub mod portfolio;
pub mod session;
pub mod simulators;
pub mod stocks;
pub mod ticker;
pub mod types;

// === 2. Re-export the public-facing components to create a clean API ===

// --- From our `market` engine ---
pub use market::{Market, SharedMarket};
pub use ticker::Ticker;

// --- From `simulators` ---
pub use simulators::{PriceModel, UniformWalk};

// --- From `portfolio` ---
pub use portfolio::{Clock, FixedClock, HoldingValue, Ledger, SystemClock, Valuation};

// --- From `session` ---
pub use session::{MenuChoice, Session, SessionOptions};

// --- From `stocks` / `types` ---
pub use stocks::{Stock, Symbol};
pub use types::{Cents, Side, Transaction};

pub use config::Config;
pub use error::{Error, Result};
