//! CandleLab CLI — single runs, parameter sweeps, benchmarks, data inspection.
//!
//! Commands:
//! - `run` — one MA-crossover run from a TOML config, summary printed as JSON
//! - `sweep` — full parameter grid, batched parallel dispatch, reports on disk
//! - `benchmark` — full grid without reports, timing only
//! - `inspect` — load a candle file and report its shape and hash

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use candlelab_core::data::{dataset_hash, load_candles};
use candlelab_runner::{
    build_jobs, clean_output, generate_parameter_sets, run_batched, run_job_on, write_reports,
    BatchOutcome, ExperimentConfig,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "candlelab",
    about = "CandleLab CLI — candle-driven strategy backtesting"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single parameter set and print its summary as JSON.
    Run {
        /// Path to a TOML experiment config.
        #[arg(long)]
        config: PathBuf,

        /// Short SMA window. Defaults to the first grid point.
        #[arg(long, requires = "long")]
        short: Option<usize>,

        /// Long SMA window. Defaults to the first grid point.
        #[arg(long, requires = "short")]
        long: Option<usize>,
    },
    /// Run the full parameter grid and write reports.
    Sweep {
        /// Path to a TOML experiment config.
        #[arg(long)]
        config: PathBuf,

        /// Empty the output directory first.
        #[arg(long, default_value_t = false)]
        clean: bool,
    },
    /// Time the full parameter grid without writing reports.
    Benchmark {
        /// Path to a TOML experiment config.
        #[arg(long)]
        config: PathBuf,
    },
    /// Load a candle file and print count, time range and dataset hash.
    Inspect {
        /// `.csv` or `.parquet` candle file.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            short,
            long,
        } => run_single(&config, short.zip(long)),
        Commands::Sweep { config, clean } => run_sweep(&config, clean),
        Commands::Benchmark { config } => run_benchmark(&config),
        Commands::Inspect { path } => run_inspect(&path),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<ExperimentConfig> {
    ExperimentConfig::from_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn run_single(config_path: &Path, windows: Option<(usize, usize)>) -> Result<()> {
    let config = load_config(config_path)?;
    let grid = &config.strategies.ma_crossover;
    let params = match windows {
        Some((short, long)) => grid.params(short, long),
        None => match generate_parameter_sets(grid).first() {
            Some(&params) => params,
            None => bail!("config has no valid (short < long) window pair"),
        },
    };

    let candles = load_candles(&config.data.path)
        .with_context(|| format!("failed to load {}", config.data.path.display()))?;
    let jobs = build_jobs(&config, &[params]);
    let Some(job) = jobs.first() else {
        bail!("no job built for {}", params.strategy_id());
    };
    let result = run_job_on(&candles, job)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Build every job in the config's grid and dispatch it in batches.
fn dispatch_grid(config: &ExperimentConfig) -> Result<BatchOutcome> {
    let params = generate_parameter_sets(&config.strategies.ma_crossover);
    if params.is_empty() {
        bail!("config has no valid (short < long) window pair");
    }
    let jobs = build_jobs(config, &params);
    info!(
        jobs = jobs.len(),
        workers = config.parallel.workers,
        batch_size = config.parallel.batch_size,
        "dispatching sweep"
    );
    let outcome = run_batched(&jobs, config.parallel.workers, config.parallel.batch_size)?;
    if outcome.results.is_empty() {
        bail!("all {} jobs failed", outcome.failures.len());
    }
    Ok(outcome)
}

fn run_sweep(config_path: &Path, clean: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let out_dir = &config.output.dir;
    if clean {
        clean_output(out_dir)?;
    }

    let started = Instant::now();
    let outcome = dispatch_grid(&config)?;
    let elapsed = started.elapsed().as_secs_f64();

    write_reports(out_dir, &outcome.results)?;

    println!("Total strategies run: {}", outcome.results.len());
    if !outcome.failures.is_empty() {
        println!("Failed strategies: {}", outcome.failures.len());
    }
    println!("Total backtest time: {elapsed:.2} seconds");
    println!("Results written to: {}", out_dir.display());
    Ok(())
}

fn run_benchmark(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    let started = Instant::now();
    let outcome = dispatch_grid(&config)?;
    let elapsed = started.elapsed().as_secs_f64();

    let total = outcome.total();
    println!("Total strategies: {total}");
    println!("Total time (sec): {elapsed:.2}");
    println!("Avg time / strategy (sec): {:.4}", elapsed / total as f64);
    Ok(())
}

fn run_inspect(path: &Path) -> Result<()> {
    let candles =
        load_candles(path).with_context(|| format!("failed to load {}", path.display()))?;
    let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
        bail!("{} contains no candles", path.display());
    };

    println!("File: {}", path.display());
    println!("Candles: {}", candles.len());
    println!("First: {}", first.timestamp);
    println!("Last: {}", last.timestamp);
    println!("Hash: {}", dataset_hash(&candles));
    Ok(())
}
