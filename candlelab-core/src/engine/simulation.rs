//! Candle-by-candle simulation loop.
//!
//! Per candle:
//! 1. The strategy folds in the candle and emits a signal.
//! 2. Buy/Sell are priced by the execution model and applied to the ledger
//!    together with the strategy's stop hint. Hold still goes to the ledger at
//!    the close so the stop-loss is checked every candle.
//! 3. If the ledger closed a position, the realized PnL is recorded and a
//!    strategy that still believes it is long is forced flat.
//! 4. Equity is marked at the close and sampled.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::execution::{ExecutionError, ExecutionModel};
use super::ledger::{LedgerError, LedgerStatus, PortfolioLedger, DEFAULT_STOP_FRACTION};
use super::metrics::{MetricsCollector, RunSummary};
use crate::data::CandleSource;
use crate::domain::{Candle, PositionState, Signal};
use crate::strategy::{force_position, stop_hint, Strategy};

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Capital and friction settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    pub stop_loss_fraction: f64,
    pub commission_rate: f64,
    pub slippage_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let execution = ExecutionModel::default();
        Self {
            initial_capital: 100_000.0,
            stop_loss_fraction: DEFAULT_STOP_FRACTION,
            commission_rate: execution.commission_rate(),
            slippage_rate: execution.slippage_rate(),
        }
    }
}

impl SimulationConfig {
    /// Zero-friction config with the given capital.
    pub fn frictionless(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            commission_rate: 0.0,
            slippage_rate: 0.0,
            ..Self::default()
        }
    }
}

/// What happened on one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tick {
    pub timestamp: NaiveDateTime,
    pub signal: Signal,
    /// Net fill price, present only for Buy/Sell.
    pub fill: Option<f64>,
    pub status: LedgerStatus,
    pub equity: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationLoop {
    execution: ExecutionModel,
    ledger: PortfolioLedger,
    metrics: MetricsCollector,
}

impl SimulationLoop {
    pub fn new(ledger: PortfolioLedger, execution: ExecutionModel) -> Self {
        let metrics = MetricsCollector::new(ledger.initial_capital());
        Self {
            execution,
            ledger,
            metrics,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self, EngineError> {
        let ledger = PortfolioLedger::new(config.initial_capital, config.stop_loss_fraction)?;
        let execution = ExecutionModel::new(config.commission_rate, config.slippage_rate)?;
        Ok(Self::new(ledger, execution))
    }

    /// Drain `source` through `strategy` and summarize.
    pub fn run(&mut self, source: &mut dyn CandleSource, strategy: &mut dyn Strategy) -> RunSummary {
        if let Some(n) = source.remaining_hint() {
            self.metrics.reserve(n);
        }
        let mut candles = 0usize;
        while source.has_next() {
            let Some(candle) = source.next_candle() else {
                break;
            };
            self.step(&candle, strategy);
            candles += 1;
        }
        let summary = self.metrics.summary();
        debug!(
            strategy = strategy.name(),
            candles,
            trades = summary.total_trades,
            total_pnl = summary.total_pnl,
            "simulation finished"
        );
        summary
    }

    /// Process a single candle.
    pub fn step(&mut self, candle: &Candle, strategy: &mut dyn Strategy) -> Tick {
        let signal = strategy.on_candle(candle);

        let fill = self.execution.execute(signal, candle.close);
        let status = match fill {
            Some(price) => {
                let hint = stop_hint(strategy);
                self.ledger.update(Some(signal), price, hint)
            }
            None => self.ledger.update(None, candle.close, None),
        };

        if status == LedgerStatus::Closed {
            if let Some(trade) = self.ledger.trades().last() {
                self.metrics.record_trade(trade.pnl);
            }
            if strategy.position().is_long() {
                debug!(strategy = strategy.name(), "forcing strategy flat after ledger close");
                force_position(strategy, PositionState::Flat);
            }
        }

        let equity = self.ledger.equity(candle.close);
        self.metrics.update_equity(equity);

        trace!(timestamp = %candle.timestamp, %signal, ?fill, ?status, equity, "tick");
        Tick {
            timestamp: candle.timestamp,
            signal,
            fill,
            status,
            equity,
        }
    }

    pub fn ledger(&self) -> &PortfolioLedger {
        &self.ledger
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Clear ledger and metrics for another independent run.
    pub fn reset(&mut self) {
        self.ledger.reset();
        self.metrics.reset();
    }
}
