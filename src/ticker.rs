// src/ticker.rs

//! Optional background ticking of a shared market.
//!
//! The session still owns the ledger. It only reads prices from the shared
//! market, under a read lock, at the moment a trade is checked and committed.

use crate::market::SharedMarket;
use crate::simulators::PriceModel;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Ticks `market` with `model` every `interval` until stopped.
    pub fn spawn<M>(market: SharedMarket, mut model: M, interval: Duration) -> Self
    where
        M: PriceModel + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        info!(interval_ms = interval.as_millis() as u64, "background ticker started");

        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                // wait one tick before touching the market
                thread::sleep(interval);
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                market.write().update_prices(&mut model);
            }
            debug!("background ticker exiting");
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signals the thread and waits for it to finish its current tick.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
