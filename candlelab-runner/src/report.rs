//! Result persistence: per-run JSON, the ranked summary CSV, and per-run
//! drawdown curves.
//!
//! Layout under the output directory:
//!
//! ```text
//! <out>/runs/<strategy_id>.json
//! <out>/drawdowns/<strategy_id>.csv
//! <out>/summary.csv
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analytics::{drawdown_series, enrich, SummaryRow};
use crate::job::RunResult;

pub const RUNS_DIR: &str = "runs";
pub const DRAWDOWNS_DIR: &str = "drawdowns";
pub const SUMMARY_FILE: &str = "summary.csv";

/// Write one run as pretty JSON to `runs/<strategy_id>.json`.
pub fn write_run_json(out_dir: &Path, result: &RunResult) -> Result<PathBuf> {
    let dir = out_dir.join(RUNS_DIR);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.json", result.strategy_id));
    let json = serde_json::to_string_pretty(result)
        .with_context(|| format!("failed to serialize run {}", result.strategy_id))?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Write the ranked summary rows to `summary.csv`, in the order given.
pub fn write_summary_csv(out_dir: &Path, rows: &[SummaryRow]) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let path = out_dir.join(SUMMARY_FILE);
    let mut wtr = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(path)
}

/// Write the run's fractional drawdown curve to `drawdowns/<strategy_id>.csv`.
///
/// Columns: index, equity, drawdown
pub fn write_drawdown_csv(out_dir: &Path, result: &RunResult) -> Result<PathBuf> {
    let dir = out_dir.join(DRAWDOWNS_DIR);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.csv", result.strategy_id));

    let equity = &result.summary.equity_curve;
    let drawdown = drawdown_series(equity);
    let mut wtr = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    wtr.write_record(["index", "equity", "drawdown"])?;
    for (i, (eq, dd)) in equity.iter().zip(&drawdown).enumerate() {
        wtr.write_record([i.to_string(), eq.to_string(), dd.to_string()])?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(path)
}

/// Remove everything inside `out_dir`, keeping the directory itself. A missing
/// directory is created.
pub fn clean_output(out_dir: &Path) -> Result<()> {
    if !out_dir.exists() {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
        return Ok(());
    }
    let entries = std::fs::read_dir(out_dir)
        .with_context(|| format!("failed to read {}", out_dir.display()))?;
    let mut removed = 0usize;
    for entry in entries {
        let path = entry?.path();
        let removal = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        removal.with_context(|| format!("failed to remove {}", path.display()))?;
        removed += 1;
    }
    debug!(dir = %out_dir.display(), removed, "cleaned output directory");
    Ok(())
}

/// Persist every run plus the ranked summary. Returns the summary rows.
pub fn write_reports(out_dir: &Path, results: &[RunResult]) -> Result<Vec<SummaryRow>> {
    for result in results {
        write_run_json(out_dir, result)?;
        write_drawdown_csv(out_dir, result)?;
    }
    let rows = enrich(results);
    let path = write_summary_csv(out_dir, &rows)?;
    info!(runs = results.len(), summary = %path.display(), "reports written");
    Ok(rows)
}
