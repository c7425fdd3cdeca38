//! CandleLab Core: candle domain types, streaming indicators, the strategy
//! interface, and the simulation engine.
//!
//! One run wires these together:
//! - a [`data::CandleSource`] supplying candles in time order
//! - a [`strategy::Strategy`] turning each candle into Buy/Sell/Hold
//! - the [`engine::ExecutionModel`] pricing fills net of slippage and commission
//! - the [`engine::PortfolioLedger`] enforcing the long-only position and stop-loss
//! - the [`engine::MetricsCollector`] sampling equity and realized PnL
//!
//! [`engine::SimulationLoop`] drives them one candle at a time and keeps the
//! strategy's position belief in step with the ledger.

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;
