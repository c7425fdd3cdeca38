//! Cross-run analytics: drawdown curves and ranked summary rows.

use serde::{Deserialize, Serialize};

use crate::job::RunResult;

/// Fractional drawdown `(value - peak) / peak` per sample, with the peak seeded
/// from the first sample. Samples under a non-positive peak report 0.
pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
    let Some(&first) = equity.first() else {
        return Vec::new();
    };
    let mut peak = first;
    equity
        .iter()
        .map(|&value| {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 {
                (value - peak) / peak
            } else {
                0.0
            }
        })
        .collect()
}

/// One line of `summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub strategy_id: String,
    pub short_window: usize,
    pub long_window: usize,
    pub total_pnl: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub trades: usize,
    pub pnl_per_trade: f64,
    pub pnl_to_dd_ratio: f64,
    pub rank_by_pnl: usize,
    pub rank_by_drawdown: usize,
}

impl SummaryRow {
    fn from_result(result: &RunResult) -> Self {
        let s = &result.summary;
        let dd = s.max_drawdown.abs();
        Self {
            strategy_id: result.strategy_id.clone(),
            short_window: result.parameters.short_window,
            long_window: result.parameters.long_window,
            total_pnl: s.total_pnl,
            max_drawdown: s.max_drawdown,
            win_rate: s.win_rate,
            trades: s.total_trades,
            pnl_per_trade: if s.total_trades > 0 {
                s.total_pnl / s.total_trades as f64
            } else {
                0.0
            },
            pnl_to_dd_ratio: if dd > 0.0 { s.total_pnl / dd } else { 0.0 },
            rank_by_pnl: 0,
            rank_by_drawdown: 0,
        }
    }
}

/// Derive ratios and ranks for every result.
///
/// `rank_by_pnl` is 1 for the highest PnL; `rank_by_drawdown` is 1 for the
/// smallest absolute drawdown. Both sorts are stable, so ties keep the order
/// of the previous sort (input order for PnL, PnL rank for drawdown). Rows come
/// back ordered by `rank_by_drawdown`.
pub fn enrich(results: &[RunResult]) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = results.iter().map(SummaryRow::from_result).collect();

    rows.sort_by(|a, b| b.total_pnl.total_cmp(&a.total_pnl));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank_by_pnl = i + 1;
    }

    rows.sort_by(|a, b| a.max_drawdown.abs().total_cmp(&b.max_drawdown.abs()));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank_by_drawdown = i + 1;
    }
    rows
}
