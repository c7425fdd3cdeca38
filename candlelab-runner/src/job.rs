//! Jobs: one (parameter set, dataset) pair, run in isolation.
//!
//! A job owns everything its run mutates. Workers build a fresh strategy,
//! ledger, metrics collector and execution model per job, so nothing is shared
//! between concurrently running jobs except read-only candles.

use std::path::PathBuf;

use candlelab_core::data::{dataset_hash, load_candles, CandleFeed, IngestError};
use candlelab_core::domain::Candle;
use candlelab_core::engine::{EngineError, RunSummary, SimulationConfig, SimulationLoop};
use candlelab_core::strategy::{MaCrossover, MaCrossoverParams, Strategy, StrategyError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ExperimentConfig;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("data: {0}")]
    Ingest(#[from] IngestError),

    #[error("strategy: {0}")]
    Strategy(#[from] StrategyError),

    #[error("engine: {0}")]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub params: MaCrossoverParams,
    pub data_path: PathBuf,
    pub simulation: SimulationConfig,
}

impl Job {
    pub fn strategy_id(&self) -> String {
        self.params.strategy_id()
    }
}

/// One job per parameter set, all sharing the experiment's data and settings.
pub fn build_jobs(config: &ExperimentConfig, params: &[MaCrossoverParams]) -> Vec<Job> {
    let simulation = config.simulation();
    params
        .iter()
        .map(|&params| Job {
            params,
            data_path: config.data.path.clone(),
            simulation,
        })
        .collect()
}

/// Outcome of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub strategy_id: String,
    pub parameters: MaCrossoverParams,
    #[serde(flatten)]
    pub summary: RunSummary,
    pub dataset_hash: String,
    pub candle_count: usize,
}

/// Load the job's dataset and run it.
pub fn run_job(job: &Job) -> Result<RunResult, JobError> {
    let candles = load_candles(&job.data_path)?;
    run_job_on(&candles, job)
}

/// Run a job against already-loaded candles.
pub fn run_job_on(candles: &[Candle], job: &Job) -> Result<RunResult, JobError> {
    run_with_hash(candles, dataset_hash(candles), job)
}

pub(crate) fn run_with_hash(
    candles: &[Candle],
    dataset_hash: String,
    job: &Job,
) -> Result<RunResult, JobError> {
    let mut strategy = MaCrossover::new(job.params)?;
    if candles.len() < strategy.warmup() {
        warn!(
            strategy_id = %job.strategy_id(),
            candles = candles.len(),
            warmup = strategy.warmup(),
            "dataset shorter than warmup, run cannot trade"
        );
    }
    let mut sim = SimulationLoop::from_config(&job.simulation)?;
    let summary = sim.run(&mut CandleFeed::new(candles), &mut strategy);
    debug!(
        strategy_id = %job.strategy_id(),
        trades = summary.total_trades,
        total_pnl = summary.total_pnl,
        "job finished"
    );
    Ok(RunResult {
        strategy_id: job.strategy_id(),
        parameters: job.params,
        summary,
        dataset_hash,
        candle_count: candles.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use candlelab_core::data::synthetic_candles;

    fn job(short: usize, long: usize) -> Job {
        Job {
            params: MaCrossoverParams::new(short, long),
            data_path: PathBuf::from("unused.csv"),
            simulation: SimulationConfig::default(),
        }
    }

    #[test]
    fn result_carries_identity_and_data_tag() {
        let candles = synthetic_candles(400, 8);
        let result = run_job_on(&candles, &job(10, 30)).unwrap();
        assert_eq!(result.strategy_id, "ma_10_30");
        assert_eq!(result.parameters.short_window, 10);
        assert_eq!(result.candle_count, 400);
        assert_eq!(result.dataset_hash, dataset_hash(&candles));
        assert_eq!(result.summary.equity_curve.len(), 400);
    }

    #[test]
    fn dataset_inside_warmup_runs_without_trading() {
        let candles = synthetic_candles(30, 8);
        let j = job(10, 30);
        assert!(candles.len() < MaCrossover::new(j.params).unwrap().warmup());

        let result = run_job_on(&candles, &j).unwrap();
        assert_eq!(result.summary.total_trades, 0);
        assert_eq!(result.summary.equity_curve.len(), 30);
        assert!(result
            .summary
            .equity_curve
            .iter()
            .all(|&e| e == j.simulation.initial_capital));
    }

    #[test]
    fn invalid_params_fail_the_job() {
        let candles = synthetic_candles(10, 8);
        assert!(matches!(
            run_job_on(&candles, &job(30, 10)),
            Err(JobError::Strategy(_))
        ));
    }

    #[test]
    fn missing_data_fails_the_job() {
        let mut j = job(10, 30);
        j.data_path = PathBuf::from("/nonexistent/candles.csv");
        assert!(matches!(run_job(&j), Err(JobError::Ingest(_))));
    }

    #[test]
    fn result_json_is_flat() {
        let candles = synthetic_candles(100, 1);
        let result = run_job_on(&candles, &job(5, 20)).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("total_pnl").is_some());
        assert!(json.get("equity_curve").is_some());
        assert_eq!(json["parameters"]["long_window"], 20);

        let back: RunResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.strategy_id, result.strategy_id);
        assert_eq!(back.summary.total_trades, result.summary.total_trades);
        assert_eq!(back.candle_count, 100);
    }
}
