//! Config → grid → dispatch → reports, against a candle file on disk.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use candlelab_core::data::synthetic_candles;
use candlelab_core::domain::Candle;
use candlelab_runner::{
    build_jobs, clean_output, generate_parameter_sets, run_batched, run_sweep_in_memory,
    write_reports, ExperimentConfig,
};

fn write_csv(path: &Path, candles: &[Candle]) {
    let mut file = File::create(path).unwrap();
    writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
    for c in candles {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            c.timestamp.format("%Y-%m-%d %H:%M:%S"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        )
        .unwrap();
    }
}

fn config(data: &Path, out: &Path) -> ExperimentConfig {
    let toml = format!(
        r#"
[data]
path = "{}"

[portfolio]
capital = 10000.0

[strategies.ma_crossover]
short_window = [5, 10, 40]
long_window = [20, 40]

[parallel]
workers = 3
batch_size = 2

[output]
dir = "{}"
"#,
        data.display(),
        out.display()
    );
    ExperimentConfig::from_toml(&toml).unwrap()
}

#[test]
fn file_backed_sweep_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("candles.csv");
    let out = dir.path().join("results");
    let candles = synthetic_candles(600, 11);
    write_csv(&data, &candles);

    let config = config(&data, &out);
    let params = generate_parameter_sets(&config.strategies.ma_crossover);
    // (5,20) (5,40) (10,20) (10,40); 40 pairs with nothing.
    assert_eq!(params.len(), 4);

    let jobs = build_jobs(&config, &params);
    let outcome = run_batched(&jobs, config.parallel.workers, config.parallel.batch_size).unwrap();
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.results.len(), 4);
    for result in &outcome.results {
        assert_eq!(result.candle_count, 600);
        assert_eq!(result.summary.equity_curve.len(), 600);
    }

    let rows = write_reports(&config.output.dir, &outcome.results).unwrap();
    assert_eq!(rows.len(), 4);
    let mut pnl_ranks: Vec<usize> = rows.iter().map(|r| r.rank_by_pnl).collect();
    pnl_ranks.sort_unstable();
    assert_eq!(pnl_ranks, vec![1, 2, 3, 4]);

    for id in ["ma_5_20", "ma_5_40", "ma_10_20", "ma_10_40"] {
        assert!(out.join("runs").join(format!("{id}.json")).exists());
        assert!(out.join("drawdowns").join(format!("{id}.csv")).exists());
    }
    assert!(out.join("summary.csv").exists());

    clean_output(&out).unwrap();
    assert!(!out.join("runs").exists());
    assert!(out.exists());
}

#[test]
fn file_backed_and_in_memory_sweeps_agree() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("candles.csv");
    let candles = synthetic_candles(500, 5);
    write_csv(&data, &candles);

    let config = config(&data, &dir.path().join("results"));
    let jobs = build_jobs(&config, &generate_parameter_sets(&config.strategies.ma_crossover));

    let mut from_disk = run_batched(&jobs, 2, 3).unwrap().results;
    let mut in_memory = run_sweep_in_memory(&candles, &jobs, 2).unwrap().results;
    from_disk.sort_by(|a, b| a.strategy_id.cmp(&b.strategy_id));
    in_memory.sort_by(|a, b| a.strategy_id.cmp(&b.strategy_id));
    assert_eq!(from_disk, in_memory);
}

#[test]
fn missing_data_file_fails_each_job_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir.path().join("absent.csv"), &dir.path().join("results"));
    let jobs = build_jobs(&config, &generate_parameter_sets(&config.strategies.ma_crossover));

    let outcome = run_batched(&jobs, 2, 2).unwrap();
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.failures.len(), jobs.len());
}
