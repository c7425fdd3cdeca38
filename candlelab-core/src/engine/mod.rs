//! Simulation engine: execution cost model, portfolio ledger, metrics, and the
//! loop that drives a strategy through them.

pub mod execution;
pub mod ledger;
pub mod metrics;
pub mod simulation;

pub use execution::{ExecutionError, ExecutionModel};
pub use ledger::{LedgerError, LedgerStatus, PortfolioLedger, DEFAULT_STOP_FRACTION};
pub use metrics::{round2, MetricsCollector, RunSummary};
pub use simulation::{EngineError, SimulationConfig, SimulationLoop, Tick};
