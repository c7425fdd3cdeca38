//! Bounded parallel dispatch of jobs.
//!
//! Jobs run on a dedicated rayon pool of `workers` threads. In file-backed mode
//! they are submitted `batch_size` at a time so that at most one batch of
//! datasets is resident at once. A failing job is logged and reported in
//! [`BatchOutcome::failures`]; it never aborts the other jobs.

use std::time::Instant;

use candlelab_core::data::dataset_hash;
use candlelab_core::domain::Candle;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;
use tracing::{info, warn};

use crate::job::{run_job, run_with_hash, Job, JobError, RunResult};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("workers must be at least 1")]
    NoWorkers,

    #[error("batch_size must be at least 1")]
    EmptyBatch,

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] ThreadPoolBuildError),
}

/// A job that did not produce a result.
#[derive(Debug)]
pub struct JobFailure {
    pub strategy_id: String,
    pub error: JobError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<RunResult>,
    pub failures: Vec<JobFailure>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    fn absorb(&mut self, outcomes: Vec<(String, Result<RunResult, JobError>)>) {
        for (strategy_id, outcome) in outcomes {
            match outcome {
                Ok(result) => self.results.push(result),
                Err(error) => {
                    warn!(%strategy_id, %error, "job failed");
                    self.failures.push(JobFailure { strategy_id, error });
                }
            }
        }
    }
}

fn build_pool(workers: usize) -> Result<ThreadPool, DispatchError> {
    if workers == 0 {
        return Err(DispatchError::NoWorkers);
    }
    Ok(ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("candlelab-worker-{i}"))
        .build()?)
}

/// Run file-backed jobs in chunks of `batch_size`; each job loads its own data.
pub fn run_batched(
    jobs: &[Job],
    workers: usize,
    batch_size: usize,
) -> Result<BatchOutcome, DispatchError> {
    run_batched_with(jobs, workers, batch_size, run_job)
}

/// [`run_batched`] with a caller-supplied worker function.
pub fn run_batched_with<F>(
    jobs: &[Job],
    workers: usize,
    batch_size: usize,
    worker: F,
) -> Result<BatchOutcome, DispatchError>
where
    F: Fn(&Job) -> Result<RunResult, JobError> + Sync,
{
    if batch_size == 0 {
        return Err(DispatchError::EmptyBatch);
    }
    let pool = build_pool(workers)?;
    let mut outcome = BatchOutcome::default();
    let batches = jobs.len().div_ceil(batch_size);

    for (index, batch) in jobs.chunks(batch_size).enumerate() {
        let started = Instant::now();
        let outcomes: Vec<_> = pool.install(|| {
            batch
                .par_iter()
                .map(|job| (job.strategy_id(), worker(job)))
                .collect()
        });
        let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
        info!(
            batch = index + 1,
            of = batches,
            jobs = batch.len(),
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch complete"
        );
        outcome.absorb(outcomes);
    }
    Ok(outcome)
}

/// Run every job against one shared, already-loaded dataset.
pub fn run_sweep_in_memory(
    candles: &[Candle],
    jobs: &[Job],
    workers: usize,
) -> Result<BatchOutcome, DispatchError> {
    let pool = build_pool(workers)?;
    let hash = dataset_hash(candles);
    let started = Instant::now();
    let outcomes: Vec<_> = pool.install(|| {
        jobs.par_iter()
            .map(|job| (job.strategy_id(), run_with_hash(candles, hash.clone(), job)))
            .collect()
    });
    info!(
        jobs = jobs.len(),
        candles = candles.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "in-memory sweep complete"
    );
    let mut outcome = BatchOutcome::default();
    outcome.absorb(outcomes);
    Ok(outcome)
}
