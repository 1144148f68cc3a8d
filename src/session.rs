// src/session.rs

//! The interactive menu loop.
//!
//! Generic over its reader and writer so the whole console can be driven
//! from a byte buffer in tests. The ledger lives on the loop's stack and is
//! handed to each menu handler by reference.

use crate::config::{DEFAULT_SAVE_PATH, DEFAULT_STARTING_CASH, DEFAULT_USERNAME};
use crate::error::{PersistError, Result};
use crate::market::SharedMarket;
use crate::persistence;
use crate::portfolio::{Clock, Ledger, SystemClock};
use crate::simulators::PriceModel;
use crate::stocks::normalize_symbol;
use crate::types::{Cents, Side};
use std::io::{BufRead, ErrorKind, Write};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ViewMarket,
    Buy,
    Sell,
    ViewPortfolio,
    ViewTransactions,
    SaveAndExit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::ViewMarket),
            "2" => Some(Self::Buy),
            "3" => Some(Self::Sell),
            "4" => Some(Self::ViewPortfolio),
            "5" => Some(Self::ViewTransactions),
            "6" => Some(Self::SaveAndExit),
            _ => None,
        }
    }
}

/// A share count typed by the user; zero, negative and non-numeric are all
/// rejected here.
pub fn parse_quantity(input: &str) -> Option<u64> {
    input.trim().parse::<u64>().ok().filter(|&q| q > 0)
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub save_path: PathBuf,
    pub starting_cash: Cents,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            starting_cash: DEFAULT_STARTING_CASH,
        }
    }
}

pub struct Session<R, W, M, C = SystemClock> {
    input: R,
    output: W,
    market: SharedMarket,
    model: M,
    clock: C,
    options: SessionOptions,
}

impl<R: BufRead, W: Write, M: PriceModel> Session<R, W, M, SystemClock> {
    pub fn new(input: R, output: W, market: SharedMarket, model: M, options: SessionOptions) -> Self {
        Self {
            input,
            output,
            market,
            model,
            clock: SystemClock,
            options,
        }
    }
}

impl<R: BufRead, W: Write, M: PriceModel, C: Clock> Session<R, W, M, C> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Session<R, W, M, C2> {
        Session {
            input: self.input,
            output: self.output,
            market: self.market,
            model: self.model,
            clock,
            options: self.options,
        }
    }

    /// Logs in, serves menu choices until Save & Exit (or end of input), and
    /// returns the final ledger.
    pub fn run(mut self) -> Result<Ledger> {
        let mut ledger = self.load_or_create()?;

        loop {
            self.print_menu()?;
            let line = self.read_line()?;
            // Prices move on every choice, valid or not.
            self.market.write().update_prices(&mut self.model);

            let Some(line) = line else {
                writeln!(self.output)?;
                self.save_and_exit(&ledger)?;
                break;
            };
            match MenuChoice::parse(&line) {
                Some(MenuChoice::ViewMarket) => self.show_market()?,
                Some(MenuChoice::Buy) => self.trade(&mut ledger, Side::Buy)?,
                Some(MenuChoice::Sell) => self.trade(&mut ledger, Side::Sell)?,
                Some(MenuChoice::ViewPortfolio) => self.show_portfolio(&ledger)?,
                Some(MenuChoice::ViewTransactions) => self.show_transactions(&ledger)?,
                Some(MenuChoice::SaveAndExit) => {
                    self.save_and_exit(&ledger)?;
                    break;
                }
                None => writeln!(self.output, "Invalid choice.")?,
            }
        }

        Ok(ledger)
    }

    fn load_or_create(&mut self) -> Result<Ledger> {
        match persistence::load(&self.options.save_path) {
            Ok(ledger) => {
                writeln!(self.output, "Welcome back, {}", ledger.username())?;
                return Ok(ledger);
            }
            Err(PersistError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.options.save_path.display(), "no saved ledger, starting fresh");
            }
            Err(e) => {
                warn!(path = %self.options.save_path.display(), error = %e, "saved ledger unusable, starting fresh");
            }
        }

        self.prompt("Enter username: ")?;
        let username = self
            .read_line()?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let ledger = Ledger::new(username, self.options.starting_cash);
        writeln!(self.output, "New user created.")?;
        Ok(ledger)
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, "\n=== Stock Trading Simulator ===")?;
        writeln!(self.output, "1. View Market")?;
        writeln!(self.output, "2. Buy Stock")?;
        writeln!(self.output, "3. Sell Stock")?;
        writeln!(self.output, "4. View Portfolio")?;
        writeln!(self.output, "5. View Transactions")?;
        writeln!(self.output, "6. Save & Exit")?;
        self.prompt("Choose an option: ")
    }

    fn show_market(&mut self) -> Result<()> {
        writeln!(self.output, "\n--- Market Data ---")?;
        let market = self.market.read();
        for stock in market.stocks() {
            writeln!(self.output, "{stock}")?;
        }
        Ok(())
    }

    fn show_portfolio(&mut self, ledger: &Ledger) -> Result<()> {
        writeln!(self.output, "\n--- Portfolio ---")?;
        let valuation = ledger.valuation(&self.market.read());
        let valuation = match valuation {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "portfolio valuation failed");
                writeln!(self.output, "Portfolio error: {e}")?;
                return Ok(());
            }
        };
        if valuation.holdings.is_empty() {
            writeln!(self.output, "No holdings.")?;
        }
        for h in &valuation.holdings {
            writeln!(
                self.output,
                "{} | Qty: {} | Price: ${} | Value: ${}",
                h.symbol, h.quantity, h.price, h.value
            )?;
        }
        writeln!(self.output, "Cash: ${}", valuation.cash)?;
        writeln!(self.output, "Total Portfolio Value: ${}", valuation.total)?;
        Ok(())
    }

    fn show_transactions(&mut self, ledger: &Ledger) -> Result<()> {
        writeln!(self.output, "\n--- Transaction History ---")?;
        if ledger.transactions().is_empty() {
            writeln!(self.output, "No transactions.")?;
        }
        for tx in ledger.transactions() {
            writeln!(self.output, "{tx}")?;
        }
        Ok(())
    }

    fn trade(&mut self, ledger: &mut Ledger, side: Side) -> Result<()> {
        let verb = match side {
            Side::Buy => {
                self.show_market()?;
                "buy"
            }
            Side::Sell => {
                self.show_portfolio(ledger)?;
                "sell"
            }
        };

        self.prompt(&format!("Enter stock symbol to {verb}: "))?;
        let Some(raw_symbol) = self.read_line()? else {
            return Ok(());
        };
        let symbol = normalize_symbol(&raw_symbol);
        if self.market.read().get_stock(&symbol).is_none() {
            writeln!(self.output, "Stock not found.")?;
            return Ok(());
        }

        self.prompt(&format!("Enter quantity to {verb}: "))?;
        let Some(raw_quantity) = self.read_line()? else {
            return Ok(());
        };
        let Some(quantity) = parse_quantity(&raw_quantity) else {
            writeln!(self.output, "Invalid quantity.")?;
            return Ok(());
        };

        // Check and commit against one price snapshot.
        let result = {
            let market = self.market.read();
            match market.get_stock(&symbol) {
                Some(stock) => Some(match side {
                    Side::Buy => ledger.buy(stock, quantity, &self.clock),
                    Side::Sell => ledger.sell(stock, quantity, &self.clock),
                }),
                None => None,
            }
        };

        match result {
            Some(Ok(tx)) => {
                let past = match side {
                    Side::Buy => "Purchased",
                    Side::Sell => "Sold",
                };
                let total = tx.notional().unwrap_or(Cents::ZERO);
                writeln!(
                    self.output,
                    "{past} {} shares of {} at ${} (total ${total})",
                    tx.quantity, tx.symbol, tx.price
                )?;
            }
            Some(Err(e)) => writeln!(self.output, "{e}")?,
            None => writeln!(self.output, "Stock not found.")?,
        }
        Ok(())
    }

    fn save_and_exit(&mut self, ledger: &Ledger) -> Result<()> {
        match persistence::save(&self.options.save_path, ledger) {
            Ok(()) => writeln!(self.output, "User data saved.")?,
            Err(e) => {
                error!(path = %self.options.save_path.display(), error = %e, "failed to save ledger");
                writeln!(self.output, "Error saving user data.")?;
            }
        }
        writeln!(self.output, "Goodbye!")?;
        self.output.flush()?;
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }

    /// `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Market;
    use crate::portfolio::FixedClock;
    use crate::stocks::Stock;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Prices never move, so expected cash is exact.
    struct Frozen;

    impl PriceModel for Frozen {
        fn next_price(&mut self, current: Cents) -> Cents {
            current
        }
    }

    fn market() -> SharedMarket {
        Market::new(vec![
            Stock::new("AAPL", "Apple Inc.", Cents::new(100, 0)),
            Stock::new("TSLA", "Tesla Inc.", Cents::new(120, 0)),
        ])
        .unwrap()
        .into_shared()
    }

    fn run(dir: &TempDir, market: SharedMarket, script: &str) -> (Ledger, String) {
        let options = SessionOptions {
            save_path: dir.path().join("user.json"),
            starting_cash: Cents::new(10_000, 0),
        };
        let mut out = Vec::new();
        let ledger = Session::new(Cursor::new(script.to_string()), &mut out, market, Frozen, options)
            .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap()))
            .run()
            .unwrap();
        (ledger, String::from_utf8(out).unwrap())
    }

    #[test]
    fn menu_choice_parsing() {
        assert_eq!(MenuChoice::parse(" 2 "), Some(MenuChoice::Buy));
        assert_eq!(MenuChoice::parse("6"), Some(MenuChoice::SaveAndExit));
        assert_eq!(MenuChoice::parse("7"), None);
        assert_eq!(MenuChoice::parse("buy"), None);
    }

    #[test]
    fn quantity_parsing_rejects_non_positive() {
        assert_eq!(parse_quantity("5"), Some(5));
        assert_eq!(parse_quantity(" 12\n"), Some(12));
        assert_eq!(parse_quantity("0"), None);
        assert_eq!(parse_quantity("-3"), None);
        assert_eq!(parse_quantity("three"), None);
    }

    #[test]
    fn new_user_buys_sells_and_saves() {
        let dir = TempDir::new().unwrap();
        let script = "alice\n2\naapl\n5\n3\nAAPL\n2\n4\n5\n6\n";
        let (ledger, out) = run(&dir, market(), script);

        assert!(out.contains("New user created."));
        assert!(out.contains("Purchased 5 shares of AAPL at $100.00"));
        assert!(out.contains("Sold 2 shares of AAPL at $100.00"));
        assert!(out.contains("AAPL | Qty: 3 | Price: $100.00 | Value: $300.00"));
        assert!(out.contains("Cash: $9700.00"));
        assert!(out.contains("Total Portfolio Value: $10000.00"));
        assert!(out.contains("2024-02-03 04:05:06 UTC | BUY | AAPL | Qty: 5 | Price: $100.00"));
        assert!(out.contains("User data saved."));
        assert!(out.trim_end().ends_with("Goodbye!"));

        assert_eq!(ledger.username(), "alice");
        assert_eq!(ledger.holding("AAPL"), 3);
        assert_eq!(ledger.transactions().len(), 2);
        let saved = persistence::load(&dir.path().join("user.json")).unwrap();
        assert_eq!(saved, ledger);
    }

    #[test]
    fn returning_user_is_welcomed_back() {
        let dir = TempDir::new().unwrap();
        let (first, _) = run(&dir, market(), "bob\n2\nTSLA\n1\n6\n");
        let (second, out) = run(&dir, market(), "4\n6\n");

        assert!(out.contains("Welcome back, bob"));
        assert!(!out.contains("Enter username"));
        assert!(out.contains("TSLA | Qty: 1"));
        assert_eq!(second, first);
    }

    #[test]
    fn corrupt_save_file_falls_back_to_fresh_user() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("user.json"), "{ definitely not a ledger").unwrap();
        let (ledger, out) = run(&dir, market(), "carol\n6\n");
        assert!(out.contains("New user created."));
        assert_eq!(ledger.username(), "carol");
        assert_eq!(ledger.cash(), Cents::new(10_000, 0));
    }

    #[test]
    fn bad_input_is_reported_and_loop_continues() {
        let dir = TempDir::new().unwrap();
        let script = "dave\n9\nhello\n2\nZZZZ\n2\nAAPL\nlots\n2\nAAPL\n0\n2\nAAPL\n101\n3\nTSLA\n1\n6\n";
        let (ledger, out) = run(&dir, market(), script);

        assert_eq!(out.matches("Invalid choice.").count(), 2);
        assert!(out.contains("Stock not found."));
        assert_eq!(out.matches("Invalid quantity.").count(), 2);
        assert!(out.contains("Insufficient funds: need $10100.00, have $10000.00."));
        assert!(out.contains("You don't own enough shares of TSLA: requested 1, own 0."));
        assert!(out.contains("Goodbye!"));
        assert_eq!(ledger.cash(), Cents::new(10_000, 0));
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn end_of_input_saves_and_exits() {
        let dir = TempDir::new().unwrap();
        let (ledger, out) = run(&dir, market(), "erin\n2\nAAPL\n1\n");
        assert!(out.contains("User data saved."));
        assert_eq!(ledger.holding("AAPL"), 1);
        assert!(dir.path().join("user.json").exists());
    }

    #[test]
    fn empty_username_defaults() {
        let dir = TempDir::new().unwrap();
        let (ledger, _) = run(&dir, market(), "\n6\n");
        assert_eq!(ledger.username(), DEFAULT_USERNAME);
    }

    #[test]
    fn save_failure_is_reported_but_session_ends() {
        let dir = TempDir::new().unwrap();
        let options = SessionOptions {
            save_path: dir.path().join("missing").join("user.json"),
            starting_cash: Cents::new(10_000, 0),
        };
        let mut out = Vec::new();
        Session::new(Cursor::new("frank\n6\n"), &mut out, market(), Frozen, options)
            .run()
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Error saving user data."));
        assert!(out.trim_end().ends_with("Goodbye!"));
    }

    #[test]
    fn every_menu_choice_ticks_the_market() {
        let dir = TempDir::new().unwrap();
        let shared = market();
        run(&dir, std::sync::Arc::clone(&shared), "gina\n1\n9\n6\n");
        assert_eq!(shared.read().ticks(), 3);
    }

    #[test]
    fn trades_stay_consistent_under_background_ticks() {
        let dir = TempDir::new().unwrap();
        let shared = market();
        let ticker = crate::ticker::Ticker::spawn(
            std::sync::Arc::clone(&shared),
            crate::simulators::UniformWalk::seeded(9),
            std::time::Duration::from_millis(1),
        );

        let mut script = String::from("ivy\n");
        for _ in 0..300 {
            script.push_str("2\nAAPL\n3\n3\nAAPL\n2\n2\nTSLA\n1\n3\nTSLA\n1\n");
        }
        script.push_str("6\n");
        let (ledger, _) = run(&dir, std::sync::Arc::clone(&shared), &script);
        ticker.stop();
        assert!(shared.read().ticks() > 0);

        let mut cash = 1_000_000i128;
        let mut held: std::collections::BTreeMap<&str, i128> = Default::default();
        for tx in ledger.transactions() {
            let notional = tx.notional().unwrap().raw() as i128;
            let position = held.entry(tx.symbol.as_str()).or_default();
            match tx.side {
                Side::Buy => {
                    cash -= notional;
                    *position += tx.quantity as i128;
                }
                Side::Sell => {
                    cash += notional;
                    *position -= tx.quantity as i128;
                }
            }
            assert!(cash >= 0, "cash went negative");
            assert!(*position >= 0, "holding went negative");
        }
        assert!(ledger.transactions().len() > 300);
        assert_eq!(ledger.cash().raw() as i128, cash);
        for (symbol, &qty) in &held {
            assert_eq!(ledger.holding(symbol) as i128, qty);
        }
    }

    #[test]
    fn empty_portfolio_view() {
        let dir = TempDir::new().unwrap();
        let (_, out) = run(&dir, market(), "hank\n4\n5\n6\n");
        assert!(out.contains("No holdings."));
        assert!(out.contains("Total Portfolio Value: $10000.00"));
        assert!(out.contains("No transactions."));
    }
}
