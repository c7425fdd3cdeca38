//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = k * close[t] + (1 - k) * EMA[t-1], k = 2 / (period + 1).
//! Seed: the first close. The value is defined from the first candle onward,
//! so a long-period EMA is heavily biased toward early prices until roughly
//! `period` candles have passed.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    k: f64,
    name: String,
    current: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            k: 2.0 / (period as f64 + 1.0),
            name: format!("ema_{period}"),
            current: None,
        }
    }

    pub fn push(&mut self, close: f64) -> f64 {
        let next = match self.current {
            None => close,
            Some(prev) => close * self.k + prev * (1.0 - self.k),
        };
        self.current = Some(next);
        next
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, candle: &Candle) -> f64 {
        self.push(candle.close)
    }

    fn value(&self) -> Option<f64> {
        self.current
    }

    fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_seeds_with_first_close() {
        let mut ema = Ema::new(3);
        assert_eq!(ema.value(), None);
        assert_approx(ema.push(10.0), 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_period_3_recursion() {
        // k = 0.5
        let mut ema = Ema::new(3);
        ema.push(10.0);
        assert_approx(ema.push(12.0), 11.0, DEFAULT_EPSILON);
        assert_approx(ema.push(15.0), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_constant_input_is_constant() {
        let mut ema = Ema::new(200);
        for _ in 0..50 {
            assert_approx(ema.push(42.0), 42.0, DEFAULT_EPSILON);
        }
    }
}
