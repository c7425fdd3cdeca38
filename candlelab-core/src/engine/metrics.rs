//! Per-run metrics: realized trade PnL, the equity curve, and the summary
//! derived from them.

use serde::{Deserialize, Serialize};

/// Final statistics for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Sum of realized trade PnL (unrounded).
    pub total_pnl: f64,
    pub total_trades: usize,
    /// Percentage of trades with positive PnL, 2 decimals. 0 with no trades.
    pub win_rate: f64,
    /// Largest peak-to-trough equity drop in currency units, negated (≤ 0),
    /// 2 decimals.
    pub max_drawdown: f64,
    /// One equity sample per processed candle.
    pub equity_curve: Vec<f64>,
}

impl RunSummary {
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().copied()
    }
}

#[derive(Debug, Clone)]
pub struct MetricsCollector {
    starting_capital: f64,
    trades: Vec<f64>,
    equity_curve: Vec<f64>,
}

impl MetricsCollector {
    pub fn new(starting_capital: f64) -> Self {
        Self {
            starting_capital,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// Make room for `candles` more equity samples.
    pub fn reserve(&mut self, candles: usize) {
        self.equity_curve.reserve(candles);
    }

    pub fn record_trade(&mut self, pnl: f64) {
        self.trades.push(pnl);
    }

    pub fn update_equity(&mut self, equity: f64) {
        self.equity_curve.push(equity);
    }

    pub fn trades(&self) -> &[f64] {
        &self.trades
    }

    pub fn equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    /// Running equity peak after each sample, seeded with the starting capital.
    pub fn running_peaks(&self) -> Vec<f64> {
        let mut peak = self.starting_capital;
        self.equity_curve
            .iter()
            .map(|&equity| {
                if equity > peak {
                    peak = equity;
                }
                peak
            })
            .collect()
    }

    /// Largest `peak - equity` seen, as a non-negative currency amount.
    pub fn max_drawdown(&self) -> f64 {
        self.running_peaks()
            .iter()
            .zip(&self.equity_curve)
            .map(|(peak, equity)| peak - equity)
            .fold(0.0, f64::max)
    }

    pub fn summary(&self) -> RunSummary {
        let total_trades = self.trades.len();
        let wins = self.trades.iter().filter(|&&pnl| pnl > 0.0).count();
        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };
        RunSummary {
            total_pnl: self.trades.iter().sum(),
            total_trades,
            win_rate: round2(win_rate),
            // Subtracting from zero keeps a flat curve at +0.0 rather than -0.0.
            max_drawdown: 0.0 - round2(self.max_drawdown()),
            equity_curve: self.equity_curve.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.trades.clear();
        self.equity_curve.clear();
    }
}

/// Round to two decimal places, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_sends_exact_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(33.333333), 33.33);
    }

    #[test]
    fn drawdown_tie_rounds_to_even() {
        let mut m = MetricsCollector::new(1000.0);
        m.update_equity(999.875);
        assert_eq!(m.summary().max_drawdown, -0.12);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let s = MetricsCollector::new(1000.0).summary();
        assert_eq!(s.total_pnl, 0.0);
        assert_eq!(s.total_trades, 0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.max_drawdown, 0.0);
        assert!(s.max_drawdown.is_sign_positive());
        assert!(s.equity_curve.is_empty());
    }

    #[test]
    fn win_rate_is_a_rounded_percentage() {
        let mut m = MetricsCollector::new(1000.0);
        m.record_trade(10.0);
        m.record_trade(-5.0);
        m.record_trade(0.0);
        let s = m.summary();
        assert_eq!(s.total_trades, 3);
        assert_eq!(s.win_rate, 33.33);
        assert_eq!(s.total_pnl, 5.0);
    }

    #[test]
    fn drawdown_peak_starts_at_capital() {
        let mut m = MetricsCollector::new(1000.0);
        // Never above capital: drawdown measured from 1000.
        for e in [990.0, 950.0, 980.0] {
            m.update_equity(e);
        }
        assert_eq!(m.summary().max_drawdown, -50.0);
    }

    #[test]
    fn drawdown_tracks_new_peaks() {
        let mut m = MetricsCollector::new(1000.0);
        for e in [1100.0, 1050.0, 1200.0, 1080.0, 1150.0] {
            m.update_equity(e);
        }
        assert_eq!(m.running_peaks(), vec![1100.0, 1100.0, 1200.0, 1200.0, 1200.0]);
        assert_eq!(m.max_drawdown(), 120.0);
        assert_eq!(m.summary().max_drawdown, -120.0);
    }

    #[test]
    fn drawdown_is_rounded() {
        let mut m = MetricsCollector::new(100.0);
        m.update_equity(98.7649);
        assert_eq!(m.summary().max_drawdown, -1.24);
    }

    #[test]
    fn equity_curve_is_returned_verbatim() {
        let mut m = MetricsCollector::new(1.0);
        m.update_equity(1.0);
        m.update_equity(1.234_567);
        assert_eq!(m.summary().equity_curve, vec![1.0, 1.234_567]);
    }

    #[test]
    fn reset_clears_both_series() {
        let mut m = MetricsCollector::new(1.0);
        m.update_equity(1.0);
        m.record_trade(1.0);
        m.reset();
        assert!(m.trades().is_empty());
        assert!(m.equity_curve().is_empty());
    }

    #[test]
    fn summary_serializes_field_names() {
        let mut m = MetricsCollector::new(1000.0);
        m.update_equity(1000.0);
        let json = serde_json::to_value(m.summary()).unwrap();
        for key in ["total_pnl", "total_trades", "win_rate", "max_drawdown", "equity_curve"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
