// src/config.rs

//! Tunables and the optional TOML configuration file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::ConfigError;
use crate::market::Market;
use crate::stocks::{Stock, default_stock_universe};
use crate::types::Cents;

// --- Price model ---
/// Largest move, in percent, a single tick can apply to a price.
pub const MAX_TICK_CHANGE_PCT: f64 = 5.0;

// --- Ledger ---
pub const DEFAULT_STARTING_CASH: Cents = Cents::new(10_000, 0);
pub const DEFAULT_USERNAME: &str = "trader";

// --- Persistence ---
pub const DEFAULT_SAVE_PATH: &str = "user.json";
pub const LEDGER_FILE_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub save_path: PathBuf,
    /// Decimal dollars, e.g. `"10000.00"`.
    pub starting_cash: String,
    pub logging: LoggingConfig,
    /// Replaces the built-in catalog when non-empty.
    pub stocks: Vec<StockEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StockEntry {
    pub symbol: String,
    pub name: String,
    pub price: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            starting_cash: DEFAULT_STARTING_CASH.to_string(),
            logging: LoggingConfig::default(),
            stocks: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw).map_err(ConfigError::Parse)?;
        // Surface bad amounts and catalogs at startup, not mid-session.
        config.starting_cash()?;
        config.build_market()?;
        Ok(config)
    }

    pub fn starting_cash(&self) -> Result<Cents, ConfigError> {
        self.starting_cash.parse()
    }

    pub fn build_market(&self) -> Result<Market, ConfigError> {
        if self.stocks.is_empty() {
            return Ok(Market::new(default_stock_universe())?);
        }
        let stocks = self
            .stocks
            .iter()
            .map(|entry| {
                let price: Cents = entry.price.parse()?;
                Ok(Stock::new(&entry.symbol, &entry.name, price))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Market::new(stocks)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Logs go to stderr; stdout belongs to the menu.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "pretty".into(),
        }
    }
}
