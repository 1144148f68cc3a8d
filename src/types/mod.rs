// src/types/mod.rs

pub mod money;
pub mod transaction;

pub use money::Cents;
pub use transaction::{Side, Transaction};
