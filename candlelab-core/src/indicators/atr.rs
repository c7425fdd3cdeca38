//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! The first candle has no previous close, so its TR is just high-low.
//! ATR uses Wilder smoothing (alpha = 1/period), seeded with the first TR.

use super::Indicator;
use crate::domain::Candle;

/// True range of a candle given the previous close, if any.
pub fn true_range(high: f64, low: f64, prev_close: Option<f64>) -> f64 {
    let hl = high - low;
    match prev_close {
        None => hl,
        Some(pc) => hl.max((high - pc).abs()).max((low - pc).abs()),
    }
}

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    alpha: f64,
    name: String,
    prev_close: Option<f64>,
    current: Option<f64>,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            alpha: 1.0 / period as f64,
            name: format!("atr_{period}"),
            prev_close: None,
            current: None,
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, candle: &Candle) -> f64 {
        let tr = true_range(candle.high, candle.low, self.prev_close);
        let next = match self.current {
            None => tr,
            Some(prev) => self.alpha * tr + (1.0 - self.alpha) * prev,
        };
        self.current = Some(next);
        self.prev_close = Some(candle.close);
        next
    }

    fn value(&self) -> Option<f64> {
        self.current
    }

    fn reset(&mut self) {
        self.prev_close = None;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use chrono::NaiveDate;

    fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        data.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| {
                Candle::new(
                    base + chrono::Duration::days(i as i64),
                    open,
                    high,
                    low,
                    close,
                    1000.0,
                )
            })
            .collect()
    }

    #[test]
    fn true_range_basic() {
        assert_approx(true_range(105.0, 95.0, None), 10.0, DEFAULT_EPSILON);
        // max(8, |108-102|, |100-102|) = 8
        assert_approx(true_range(108.0, 100.0, Some(102.0)), 8.0, DEFAULT_EPSILON);
        // max(9, |107-106|, |98-106|) = 9
        assert_approx(true_range(107.0, 98.0, Some(106.0)), 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        // prev close 100, current 115/108: max(7, 15, 8) = 15
        assert_approx(true_range(115.0, 108.0, Some(100.0)), 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_period_3_wilder() {
        let candles = make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 10
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
        ]);
        let mut atr = Atr::new(3);
        let values: Vec<f64> = candles.iter().map(|c| atr.update(c)).collect();
        // seed = 10; then 1/3*8 + 2/3*10 = 28/3; then 1/3*9 + 2/3*28/3 = 83/9
        assert_approx(values[0], 10.0, DEFAULT_EPSILON);
        assert_approx(values[1], 28.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(values[2], 83.0 / 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_reset_forgets_prev_close() {
        let candles = make_ohlc_candles(&[(98.0, 102.0, 97.0, 100.0), (110.0, 115.0, 108.0, 112.0)]);
        let mut atr = Atr::new(14);
        atr.update(&candles[0]);
        atr.reset();
        // Without the previous close the gap does not count.
        assert_approx(atr.update(&candles[1]), 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_lookback() {
        assert_eq!(Atr::new(14).lookback(), 14);
    }
}
