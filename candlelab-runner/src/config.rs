//! Experiment configuration loaded from TOML.
//!
//! ```toml
//! [data]
//! path = "data/candles.csv"
//!
//! [portfolio]
//! capital = 100000.0
//!
//! [execution]
//! commission = 0.001
//! slippage = 0.0005
//!
//! [strategies.ma_crossover]
//! short_window = [10, 20, 30]
//! long_window = [50, 100]
//!
//! [parallel]
//! workers = 8
//! batch_size = 16
//! ```
//!
//! Every section except `[data]` may be omitted.

use std::path::{Path, PathBuf};

use candlelab_core::engine::{SimulationConfig, DEFAULT_STOP_FRACTION};
use candlelab_core::strategy::MaCrossoverParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub strategies: StrategiesConfig,
    #[serde(default)]
    pub parallel: ParallelConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// `.csv` or `.parquet` candle file.
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub capital: f64,
    #[serde(default = "default_stop_loss_fraction")]
    pub stop_loss_fraction: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            capital: 100_000.0,
            stop_loss_fraction: default_stop_loss_fraction(),
        }
    }
}

fn default_stop_loss_fraction() -> f64 {
    DEFAULT_STOP_FRACTION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    pub commission: f64,
    pub slippage: f64,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            commission: 0.001,
            slippage: 0.0005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategiesConfig {
    #[serde(default)]
    pub ma_crossover: MaCrossoverGrid,
}

/// Window lists to sweep, plus the fixed filter periods shared by every
/// grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaCrossoverGrid {
    pub short_window: Vec<usize>,
    pub long_window: Vec<usize>,
    #[serde(default = "default_ema_period")]
    pub ema_period: usize,
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
}

impl Default for MaCrossoverGrid {
    fn default() -> Self {
        let params = MaCrossoverParams::default();
        Self {
            short_window: vec![params.short_window],
            long_window: vec![params.long_window],
            ema_period: params.ema_period,
            atr_period: params.atr_period,
            rsi_period: params.rsi_period,
        }
    }
}

fn default_ema_period() -> usize {
    MaCrossoverParams::default().ema_period
}

fn default_atr_period() -> usize {
    MaCrossoverParams::default().atr_period
}

fn default_rsi_period() -> usize {
    MaCrossoverParams::default().rsi_period
}

impl MaCrossoverGrid {
    /// Parameters for one `(short, long)` point with this grid's filter periods.
    pub fn params(&self, short_window: usize, long_window: usize) -> MaCrossoverParams {
        MaCrossoverParams {
            short_window,
            long_window,
            ema_period: self.ema_period,
            atr_period: self.atr_period,
            rsi_period: self.rsi_period,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    pub workers: usize,
    pub batch_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            batch_size: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
        }
    }
}

impl ExperimentConfig {
    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        let p = &self.portfolio;
        if !(p.capital.is_finite() && p.capital > 0.0) {
            return invalid(format!("portfolio.capital must be positive, got {}", p.capital));
        }
        if !(p.stop_loss_fraction > 0.0 && p.stop_loss_fraction < 1.0) {
            return invalid(format!(
                "portfolio.stop_loss_fraction must be in (0, 1), got {}",
                p.stop_loss_fraction
            ));
        }

        for (name, rate) in [
            ("execution.commission", self.execution.commission),
            ("execution.slippage", self.execution.slippage),
        ] {
            if !(0.0..1.0).contains(&rate) {
                return invalid(format!("{name} must be in [0, 1), got {rate}"));
            }
        }

        let grid = &self.strategies.ma_crossover;
        if grid.short_window.is_empty() || grid.long_window.is_empty() {
            return invalid("strategies.ma_crossover window lists must not be empty".into());
        }
        let windows = grid.short_window.iter().chain(&grid.long_window);
        let periods = [grid.ema_period, grid.atr_period, grid.rsi_period];
        if windows.chain(&periods).any(|&w| w == 0) {
            return invalid("strategies.ma_crossover windows and periods must be positive".into());
        }

        if self.parallel.workers == 0 {
            return invalid("parallel.workers must be at least 1".into());
        }
        if self.parallel.batch_size == 0 {
            return invalid("parallel.batch_size must be at least 1".into());
        }
        Ok(())
    }

    /// Capital and friction settings shared by every run of this experiment.
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            initial_capital: self.portfolio.capital,
            stop_loss_fraction: self.portfolio.stop_loss_fraction,
            commission_rate: self.execution.commission,
            slippage_rate: self.execution.slippage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[data]
path = "data/candles.csv"

[portfolio]
capital = 50000.0
stop_loss_fraction = 0.03

[execution]
commission = 0.002
slippage = 0.001

[strategies.ma_crossover]
short_window = [10, 20]
long_window = [50, 100]
ema_period = 100

[parallel]
workers = 4
batch_size = 2

[output]
dir = "out"
"#;

    #[test]
    fn parses_full_config() {
        let config = ExperimentConfig::from_toml(FULL).unwrap();
        assert_eq!(config.data.path, PathBuf::from("data/candles.csv"));
        assert_eq!(config.portfolio.capital, 50_000.0);
        assert_eq!(config.portfolio.stop_loss_fraction, 0.03);
        assert_eq!(config.execution.commission, 0.002);
        let grid = &config.strategies.ma_crossover;
        assert_eq!(grid.short_window, vec![10, 20]);
        assert_eq!(grid.ema_period, 100);
        assert_eq!(grid.atr_period, 14);
        assert_eq!(config.parallel.workers, 4);
        assert_eq!(config.output.dir, PathBuf::from("out"));
    }

    #[test]
    fn only_data_section_is_required() {
        let config = ExperimentConfig::from_toml("[data]\npath = \"x.parquet\"\n").unwrap();
        assert_eq!(config.portfolio, PortfolioConfig::default());
        assert_eq!(config.execution, ExecutionSettings::default());
        assert_eq!(config.strategies.ma_crossover.short_window, vec![20]);
        assert!(config.parallel.workers >= 1);

        assert!(matches!(
            ExperimentConfig::from_toml("[portfolio]\ncapital = 1.0\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_invalid_values() {
        let cases = [
            ("capital = 50000.0", "capital = 0.0"),
            ("commission = 0.002", "commission = 1.5"),
            ("short_window = [10, 20]", "short_window = []"),
            ("long_window = [50, 100]", "long_window = [0, 100]"),
            ("ema_period = 100", "ema_period = 0"),
            ("workers = 4", "workers = 0"),
            ("batch_size = 2", "batch_size = 0"),
            ("stop_loss_fraction = 0.03", "stop_loss_fraction = 1.0"),
        ];
        for (from, to) in cases {
            let toml = FULL.replace(from, to);
            assert!(
                matches!(ExperimentConfig::from_toml(&toml), Err(ConfigError::Invalid(_))),
                "accepted {to}"
            );
        }
    }

    #[test]
    fn simulation_settings_follow_config() {
        let sim = ExperimentConfig::from_toml(FULL).unwrap().simulation();
        assert_eq!(sim.initial_capital, 50_000.0);
        assert_eq!(sim.stop_loss_fraction, 0.03);
        assert_eq!(sim.commission_rate, 0.002);
        assert_eq!(sim.slippage_rate, 0.001);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ExperimentConfig::from_file(Path::new("/nonexistent/experiment.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
