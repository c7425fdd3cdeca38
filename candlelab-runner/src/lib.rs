//! CandleLab Runner — experiment orchestration on top of `candlelab-core`.
//!
//! - TOML experiment config with validation
//! - MA-crossover parameter grid expansion
//! - Batched parallel dispatch with per-job failure isolation
//! - Cross-run analytics (ratios, ranks, drawdown curves)
//! - JSON/CSV result persistence

pub mod analytics;
pub mod config;
pub mod dispatch;
pub mod job;
pub mod report;
pub mod sweep;

pub use analytics::{drawdown_series, enrich, SummaryRow};
pub use config::{
    ConfigError, DataConfig, ExecutionSettings, ExperimentConfig, MaCrossoverGrid, OutputConfig,
    ParallelConfig, PortfolioConfig, StrategiesConfig,
};
pub use dispatch::{
    run_batched, run_batched_with, run_sweep_in_memory, BatchOutcome, DispatchError, JobFailure,
};
pub use job::{build_jobs, run_job, run_job_on, Job, JobError, RunResult};
pub use report::{clean_output, write_reports};
pub use sweep::{generate_parameter_sets, grid_size};
