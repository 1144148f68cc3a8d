// src/error.rs

use thiserror::Error;

use crate::types::Cents;

/// Why a buy or sell was refused. A refused trade leaves the ledger untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TradeError {
    #[error("Quantity must be a positive whole number of shares.")]
    InvalidQuantity,

    #[error("Insufficient funds: need ${needed}, have ${available}.")]
    InsufficientFunds { needed: Cents, available: Cents },

    #[error("You don't own enough shares of {symbol}: requested {requested}, own {owned}.")]
    InsufficientHoldings {
        symbol: String,
        requested: u64,
        owned: u64,
    },

    #[error("Amount too large to process.")]
    ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("duplicate symbol in catalog: {0}")]
    DuplicateSymbol(String),

    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("price for {0} must be greater than zero")]
    NonPositivePrice(String),
}

/// The ledger holds a symbol the market has never listed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuationError {
    #[error("holding {symbol} is not listed in the market")]
    UnknownSymbol { symbol: String },

    #[error("portfolio value too large to represent")]
    Overflow,
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("failed to read or write ledger file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse ledger file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("unsupported ledger file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("corrupt ledger file: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("invalid catalog: {0}")]
    Catalog(#[from] MarketError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Trade(#[from] TradeError),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
