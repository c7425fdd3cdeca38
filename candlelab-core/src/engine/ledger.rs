//! Portfolio ledger: the single-instrument, long-only position state machine.
//!
//! Transitions, checked in this order on every `update`:
//!
//! | State | Input                  | Result                                   |
//! |-------|------------------------|------------------------------------------|
//! | Flat  | Buy, cash > 0          | open at the fill price → `Open`          |
//! | Flat  | Buy, cash ≤ 0          | nothing → `InsufficientCapital`          |
//! | Flat  | anything else          | nothing → `NoOp`                         |
//! | Long  | price ≤ stop           | close, reason `StopLoss` → `Closed`      |
//! | Long  | Sell                   | close, reason `Signal` → `Closed`        |
//! | Long  | anything else          | hold → `Open`                            |
//!
//! The stop check runs before the Sell check, so a candle that both breaches
//! the stop and carries a Sell records exactly one stop-loss close.
//!
//! Positions deploy the full cash balance (`quantity = cash / fill`). Realized
//! PnL is added to cash on close; equity while long is cash plus unrealized PnL.

use crate::domain::{ClosedTrade, ExitReason, OpenPosition, PositionState, Signal};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_STOP_FRACTION: f64 = 0.02;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("stop-loss fraction must be in (0, 1), got {0}")]
    StopFractionOutOfRange(f64),
}

/// Outcome of one ledger update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    /// A position is open after this call (newly opened or still held).
    Open,
    /// A position was closed on this call.
    Closed,
    /// Buy requested while flat with no cash to deploy.
    InsufficientCapital,
    /// Flat and nothing to do.
    NoOp,
}

#[derive(Debug, Clone)]
pub struct PortfolioLedger {
    initial_capital: f64,
    default_stop_fraction: f64,
    cash: f64,
    position: Option<OpenPosition>,
    trades: Vec<ClosedTrade>,
}

impl PortfolioLedger {
    pub fn new(initial_capital: f64, default_stop_fraction: f64) -> Result<Self, LedgerError> {
        if !(initial_capital.is_finite() && initial_capital > 0.0) {
            return Err(LedgerError::NonPositiveCapital(initial_capital));
        }
        if !(default_stop_fraction > 0.0 && default_stop_fraction < 1.0) {
            return Err(LedgerError::StopFractionOutOfRange(default_stop_fraction));
        }
        Ok(Self {
            initial_capital,
            default_stop_fraction,
            cash: initial_capital,
            position: None,
            trades: Vec::new(),
        })
    }

    /// Ledger with the default 2% stop.
    pub fn with_capital(initial_capital: f64) -> Result<Self, LedgerError> {
        Self::new(initial_capital, DEFAULT_STOP_FRACTION)
    }

    /// Apply one candle's worth of input.
    ///
    /// `price` is the net fill price when `signal` is Buy or Sell, and the
    /// candle close otherwise. `stop_hint` is only consulted when a position is
    /// opened.
    pub fn update(
        &mut self,
        signal: Option<Signal>,
        price: f64,
        stop_hint: Option<f64>,
    ) -> LedgerStatus {
        let status = match self.position {
            None => match signal {
                Some(Signal::Buy) if self.cash <= 0.0 => {
                    debug!(cash = self.cash, price, "buy skipped, no capital");
                    LedgerStatus::InsufficientCapital
                }
                Some(Signal::Buy) => {
                    self.open(price, stop_hint);
                    LedgerStatus::Open
                }
                _ => LedgerStatus::NoOp,
            },
            Some(pos) if pos.is_stopped_out(price) => {
                self.close(pos, price, ExitReason::StopLoss);
                LedgerStatus::Closed
            }
            Some(pos) if signal == Some(Signal::Sell) => {
                self.close(pos, price, ExitReason::Signal);
                LedgerStatus::Closed
            }
            Some(_) => LedgerStatus::Open,
        };
        self.debug_check_invariant();
        status
    }

    /// Mark-to-market equity at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        match &self.position {
            Some(pos) => self.cash + pos.unrealized_pnl(price),
            None => self.cash,
        }
    }

    /// Back to initial capital, flat, with no trade history.
    pub fn reset(&mut self) {
        self.cash = self.initial_capital;
        self.position = None;
        self.trades.clear();
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn state(&self) -> PositionState {
        if self.position.is_some() {
            PositionState::Long
        } else {
            PositionState::Flat
        }
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    pub fn quantity(&self) -> f64 {
        self.position.map_or(0.0, |p| p.quantity)
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.position.map(|p| p.entry_price)
    }

    pub fn stop_price(&self) -> Option<f64> {
        self.position.map(|p| p.stop_price)
    }

    /// Closed trades in chronological order.
    pub fn trades(&self) -> &[ClosedTrade] {
        &self.trades
    }

    fn open(&mut self, price: f64, stop_hint: Option<f64>) {
        let quantity = self.cash / price;
        let stop_price = match stop_hint {
            Some(stop) if stop.is_finite() => stop,
            _ => price * (1.0 - self.default_stop_fraction),
        };
        debug!(price, quantity, stop_price, hinted = stop_hint.is_some(), "position opened");
        self.position = Some(OpenPosition {
            quantity,
            entry_price: price,
            stop_price,
        });
    }

    fn close(&mut self, pos: OpenPosition, price: f64, reason: ExitReason) {
        let pnl = pos.unrealized_pnl(price);
        self.cash += pnl;
        self.trades.push(ClosedTrade {
            entry_price: pos.entry_price,
            exit_price: price,
            quantity: pos.quantity,
            pnl,
            exit_reason: reason,
        });
        self.position = None;
        debug!(?reason, entry = pos.entry_price, exit = price, pnl, cash = self.cash, "position closed");
    }

    /// Panics in debug builds if the open-position fields disagree.
    fn debug_check_invariant(&self) {
        #[cfg(debug_assertions)]
        {
            if let Some(pos) = &self.position {
                assert!(
                    pos.quantity > 0.0 && pos.entry_price > 0.0 && pos.stop_price.is_finite(),
                    "ledger invariant violated: {pos:?}"
                );
            }
        }
    }
}
