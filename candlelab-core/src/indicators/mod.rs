//! Streaming indicator implementations.
//!
//! Strategies see one candle at a time, so every indicator here is
//! incremental: `update()` folds in the next candle and returns the current
//! value. Nothing is precomputed over the full series, which keeps strategies
//! free of lookahead by construction.

pub mod atr;
pub mod ema;
pub mod rsi;
pub mod sma;

pub use atr::{true_range, Atr};
pub use ema::Ema;
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Candle;
use std::collections::VecDeque;

/// An indicator that is fed candles one at a time.
pub trait Indicator: Send {
    /// Indicator name for logging (e.g. "sma_20").
    fn name(&self) -> &str;

    /// Number of candles needed before `value()` is meaningful.
    fn lookback(&self) -> usize;

    /// Fold in the next candle and return the updated value.
    fn update(&mut self, candle: &Candle) -> f64;

    /// Latest value, `None` before the first update (or until the window fills,
    /// for windowed indicators).
    fn value(&self) -> Option<f64>;

    /// Forget all history.
    fn reset(&mut self);
}

/// Fixed-capacity FIFO of the most recent samples.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "rolling window capacity must be >= 1");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Sum in insertion order, oldest first.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// The sample `n` positions from the newest (`back(0)` is the newest).
    pub fn back(&self, n: usize) -> Option<f64> {
        let len = self.values.len();
        if n >= len {
            return None;
        }
        self.values.get(len - 1 - n).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::new(
                base + chrono::Duration::minutes(15 * i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
