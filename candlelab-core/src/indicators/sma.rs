//! Simple Moving Average (SMA).
//!
//! Mean of the last `period` closes. Undefined until `period` candles have
//! been seen. The window is summed afresh on every read so the value is the
//! same as summing the slice directly, with no drift from a running total.

use super::{Indicator, RollingWindow};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
    window: RollingWindow,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
            window: RollingWindow::new(period),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Push a raw close without a full candle.
    pub fn push(&mut self, close: f64) -> Option<f64> {
        self.window.push(close);
        self.value()
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, candle: &Candle) -> f64 {
        self.push(candle.close).unwrap_or(f64::NAN)
    }

    fn value(&self) -> Option<f64> {
        if self.window.is_full() {
            Some(self.window.sum() / self.period as f64)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}
