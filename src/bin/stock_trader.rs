// src/bin/stock_trader.rs

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stock_trader::{Config, Session, SessionOptions, Ticker, UniformWalk};
use tracing::info;

/// Single-user simulated stock trading console.
#[derive(Debug, Parser)]
#[command(name = "stock_trader", version, about)]
struct Cli {
    /// TOML config file. Without it, built-in defaults are used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the ledger is loaded from and saved to.
    #[arg(long)]
    save_file: Option<PathBuf>,

    /// Seed for a reproducible price path.
    #[arg(long)]
    seed: Option<u64>,

    /// Also move prices on a background thread every N milliseconds.
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Log filter (overridden by RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,
}

fn walk(seed: Option<u64>) -> UniformWalk {
    match seed {
        Some(seed) => UniformWalk::seeded(seed),
        None => UniformWalk::from_entropy(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(path) = cli.save_file {
        config.save_path = path;
    }
    config.logging.init();

    let market = config.build_market()?.into_shared();
    let options = SessionOptions {
        save_path: config.save_path.clone(),
        starting_cash: config.starting_cash()?,
    };
    info!(stocks = market.read().len(), save_path = %options.save_path.display(), "stock_trader starting");

    let ticker = cli.tick_interval_ms.map(|ms| {
        // A different stream from the session's per-choice ticks.
        let seed = cli.seed.map(|s| s.wrapping_add(1));
        Ticker::spawn(Arc::clone(&market), walk(seed), Duration::from_millis(ms.max(1)))
    });

    let stdin = io::stdin();
    let stdout = io::stdout();
    let ledger = Session::new(stdin.lock(), stdout.lock(), market, walk(cli.seed), options).run()?;

    if let Some(ticker) = ticker {
        ticker.stop();
    }
    info!(user = ledger.username(), cash = %ledger.cash(), "stock_trader stopped");
    Ok(())
}
