//! Criterion benchmarks for sweep dispatch and result ranking.
//!
//! Run with: `cargo bench -p candlelab-runner`

use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use candlelab_core::data::synthetic_candles;
use candlelab_core::engine::SimulationConfig;
use candlelab_runner::{enrich, generate_parameter_sets, run_sweep_in_memory, Job, MaCrossoverGrid};

fn grid_jobs() -> Vec<Job> {
    let grid = MaCrossoverGrid {
        short_window: vec![5, 10, 20, 30],
        long_window: vec![40, 60, 80, 100],
        ema_period: 50,
        ..MaCrossoverGrid::default()
    };
    generate_parameter_sets(&grid)
        .into_iter()
        .map(|params| Job {
            params,
            data_path: PathBuf::from("in-memory"),
            simulation: SimulationConfig::default(),
        })
        .collect()
}

fn bench_in_memory_sweep(c: &mut Criterion) {
    let candles = synthetic_candles(20_000, 3);
    let jobs = grid_jobs();
    let mut group = c.benchmark_group("sweep_in_memory");
    group.sample_size(10);
    for workers in [1usize, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &w| {
            b.iter(|| black_box(run_sweep_in_memory(&candles, &jobs, w).unwrap()))
        });
    }
    group.finish();
}

fn bench_enrich(c: &mut Criterion) {
    let candles = synthetic_candles(5_000, 4);
    let results = run_sweep_in_memory(&candles, &grid_jobs(), 2).unwrap().results;
    c.bench_function("enrich_16_runs", |b| b.iter(|| black_box(enrich(&results))));
}

criterion_group!(benches, bench_in_memory_sweep, bench_enrich);
criterion_main!(benches);
