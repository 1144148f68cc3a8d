// src/persistence.rs

//! Versioned JSON snapshots of a [`Ledger`].
//!
//! The on-disk record is a separate set of types from the in-memory ledger,
//! so the file layout only changes when `LEDGER_FILE_VERSION` does.

use crate::config::LEDGER_FILE_VERSION;
use crate::error::PersistError;
use crate::portfolio::Ledger;
use crate::stocks::{Symbol, normalize_symbol};
use crate::types::{Cents, Side, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    username: String,
    cash_cents: u64,
    holdings: BTreeMap<Symbol, u64>,
    transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TransactionRecord {
    kind: Side,
    symbol: Symbol,
    quantity: u64,
    price_cents: u64,
    timestamp: DateTime<Utc>,
}

pub fn encode(ledger: &Ledger) -> Result<String, PersistError> {
    let file = LedgerFile {
        version: LEDGER_FILE_VERSION,
        username: ledger.username().to_string(),
        cash_cents: ledger.cash().raw(),
        holdings: ledger.holdings().clone(),
        transactions: ledger
            .transactions()
            .iter()
            .map(|tx| TransactionRecord {
                kind: tx.side,
                symbol: tx.symbol.clone(),
                quantity: tx.quantity,
                price_cents: tx.price.raw(),
                timestamp: tx.executed_at,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn decode(raw: &str) -> Result<Ledger, PersistError> {
    // Read the version alone first so a future layout fails with a clear error.
    #[derive(Deserialize)]
    struct Header {
        version: u32,
    }
    let header: Header = serde_json::from_str(raw)?;
    if header.version != LEDGER_FILE_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: header.version,
            expected: LEDGER_FILE_VERSION,
        });
    }

    let file: LedgerFile = serde_json::from_str(raw)?;
    if let Some((symbol, _)) = file.holdings.iter().find(|(_, q)| **q == 0) {
        return Err(PersistError::Corrupt(format!("zero holding for {symbol}")));
    }
    if let Some(symbol) = file.holdings.keys().find(|s| !is_catalog_key(s)) {
        return Err(PersistError::Corrupt(format!(
            "holding symbol {symbol:?} is not upper-case"
        )));
    }
    let transactions = file
        .transactions
        .into_iter()
        .enumerate()
        .map(|(i, rec)| {
            if rec.quantity == 0 || rec.price_cents == 0 {
                return Err(PersistError::Corrupt(format!(
                    "transaction {i} has a zero quantity or price"
                )));
            }
            if !is_catalog_key(&rec.symbol) {
                return Err(PersistError::Corrupt(format!(
                    "transaction {i} symbol {:?} is not upper-case",
                    rec.symbol
                )));
            }
            Ok(Transaction {
                side: rec.kind,
                symbol: rec.symbol,
                quantity: rec.quantity,
                price: Cents(rec.price_cents),
                executed_at: rec.timestamp,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Ledger::from_parts(
        file.username,
        Cents(file.cash_cents),
        file.holdings,
        transactions,
    ))
}

/// Ledger lookups are exact-key, so stored symbols must already be in the
/// market's normalized form.
fn is_catalog_key(symbol: &str) -> bool {
    !symbol.is_empty() && normalize_symbol(symbol) == symbol
}

pub fn load(path: &Path) -> Result<Ledger, PersistError> {
    let raw = fs::read_to_string(path)?;
    let ledger = decode(&raw)?;
    debug!(path = %path.display(), user = ledger.username(), "ledger loaded");
    Ok(ledger)
}

/// Writes a sibling temp file, then renames it over `path`, so a failed save
/// leaves the previous snapshot intact.
pub fn save(path: &Path, ledger: &Ledger) -> Result<(), PersistError> {
    let encoded = encode(ledger)?;
    let tmp = temp_path(path);
    let written = fs::write(&tmp, encoded.as_bytes()).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    info!(path = %path.display(), user = ledger.username(), "ledger saved");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::FixedClock;
    use crate::stocks::Stock;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn traded_ledger() -> Ledger {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
        let later = FixedClock(Utc.timestamp_opt(1_715_000_000, 123_456_789).unwrap());
        let aapl = Stock::new("AAPL", "Apple Inc.", Cents::new(170, 25));
        let tsla = Stock::new("TSLA", "Tesla Inc.", Cents::new(720, 0));

        let mut ledger = Ledger::fresh("alice");
        ledger.buy(&aapl, 3, &clock).unwrap();
        ledger.buy(&tsla, 2, &clock).unwrap();
        ledger.sell(&tsla, 2, &later).unwrap();
        ledger.sell(&aapl, 1, &later).unwrap();
        ledger
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let ledger = traded_ledger();
        let restored = decode(&encode(&ledger).unwrap()).unwrap();

        assert_eq!(restored.username(), ledger.username());
        assert_eq!(restored.cash(), ledger.cash());
        assert_eq!(restored.holdings(), ledger.holdings());
        assert_eq!(restored.transactions(), ledger.transactions());
        assert_eq!(restored, ledger);
    }

    #[test]
    fn encoded_file_is_versioned_json() {
        let encoded = encode(&traded_ledger()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["username"], "alice");
        assert_eq!(value["holdings"]["AAPL"], 2);
        assert_eq!(value["transactions"][0]["kind"], "BUY");
        assert_eq!(value["transactions"][0]["price_cents"], 17_025);
        assert_eq!(value["transactions"][2]["kind"], "SELL");
    }

    #[test]
    fn unknown_version_is_rejected() {
        let raw = r#"{"version": 99, "username": "x"}"#;
        assert!(matches!(
            decode(raw),
            Err(PersistError::UnsupportedVersion {
                found: 99,
                expected: 1
            })
        ));
    }

    #[test]
    fn garbage_and_bad_records_are_rejected() {
        assert!(matches!(decode("not json"), Err(PersistError::Format(_))));

        let zero_holding = r#"{"version":1,"username":"x","cash_cents":0,
            "holdings":{"AAPL":0},"transactions":[]}"#;
        assert!(matches!(decode(zero_holding), Err(PersistError::Corrupt(_))));

        let zero_qty = r#"{"version":1,"username":"x","cash_cents":0,"holdings":{},
            "transactions":[{"kind":"BUY","symbol":"AAPL","quantity":0,
            "price_cents":100,"timestamp":"2024-01-01T00:00:00Z"}]}"#;
        assert!(matches!(decode(zero_qty), Err(PersistError::Corrupt(_))));

        let negative_cash = r#"{"version":1,"username":"x","cash_cents":-5,
            "holdings":{},"transactions":[]}"#;
        assert!(matches!(decode(negative_cash), Err(PersistError::Format(_))));
    }

    #[test]
    fn non_normalized_symbols_are_rejected() {
        let lower_holding = r#"{"version":1,"username":"x","cash_cents":0,
            "holdings":{"aapl":2},"transactions":[]}"#;
        assert!(matches!(decode(lower_holding), Err(PersistError::Corrupt(_))));

        let padded_holding = r#"{"version":1,"username":"x","cash_cents":0,
            "holdings":{" AAPL":2},"transactions":[]}"#;
        assert!(matches!(decode(padded_holding), Err(PersistError::Corrupt(_))));

        let lower_tx = r#"{"version":1,"username":"x","cash_cents":0,"holdings":{},
            "transactions":[{"kind":"BUY","symbol":"tsla","quantity":1,
            "price_cents":100,"timestamp":"2024-01-01T00:00:00Z"}]}"#;
        assert!(matches!(decode(lower_tx), Err(PersistError::Corrupt(_))));
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        // a directory where the temp file should go makes the write fail
        let path = dir.path().join("user.json");
        std::fs::create_dir(temp_path(&path)).unwrap();
        assert!(matches!(
            save(&path, &Ledger::fresh("x")),
            Err(PersistError::Io(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        // renaming a file over a non-empty directory fails
        let path = dir.path().join("user.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();
        assert!(save(&path, &Ledger::fresh("x")).is_err());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user.json");
        let ledger = traded_ledger();

        save(&path, &ledger).unwrap();
        assert!(!temp_path(&path).exists());
        assert_eq!(load(&path).unwrap(), ledger);

        // overwrite with a different snapshot
        let fresh = Ledger::fresh("bob");
        save(&path, &fresh).unwrap();
        assert_eq!(load(&path).unwrap(), fresh);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("absent.json")),
            Err(PersistError::Io(_))
        ));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("user.json");
        assert!(matches!(
            save(&path, &Ledger::fresh("x")),
            Err(PersistError::Io(_))
        ));
    }
}
