//! Relative Strength Index (RSI).
//!
//! Simple-average variant over the last `period` close-to-close changes:
//! avg_gain = sum(gains) / period, avg_loss = sum(losses) / period,
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! Edge cases: fewer than period+1 closes → 50 (neutral); avg_loss == 0 → 100.

use super::{Indicator, RollingWindow};
use crate::domain::Candle;

/// Neutral reading reported before enough closes have been seen.
pub const NEUTRAL_RSI: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
    closes: RollingWindow,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
            closes: RollingWindow::new(period + 1),
        }
    }

    pub fn push(&mut self, close: f64) -> f64 {
        self.closes.push(close);
        self.current()
    }

    fn current(&self) -> f64 {
        if !self.closes.is_full() {
            return NEUTRAL_RSI;
        }
        let mut gains = 0.0;
        let mut losses = 0.0;
        let mut prev: Option<f64> = None;
        for close in self.closes.iter() {
            if let Some(p) = prev {
                let delta = close - p;
                if delta > 0.0 {
                    gains += delta;
                } else if delta < 0.0 {
                    losses -= delta;
                }
            }
            prev = Some(close);
        }
        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;
        if avg_loss == 0.0 {
            return 100.0;
        }
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + 1
    }

    fn update(&mut self, candle: &Candle) -> f64 {
        self.push(candle.close)
    }

    fn value(&self) -> Option<f64> {
        if self.closes.is_empty() {
            None
        } else {
            Some(self.current())
        }
    }

    fn reset(&mut self) {
        self.closes.clear();
    }
}
