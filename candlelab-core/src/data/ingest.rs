//! Candle ingestion from CSV and Parquet files.
//!
//! Both formats go through the same row validation: every timestamp must parse,
//! every candle must pass the OHLC sanity check, and timestamps must be
//! strictly increasing. The first violation aborts the load with its row
//! number (1-based, header excluded). Nothing is repaired or skipped.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::Candle;

/// Accepted names for the timestamp column, in lookup order.
pub const TIMESTAMP_COLUMNS: [&str; 4] = ["timestamp", "open_time", "date", "time"];
const PRICE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d-%m-%Y %H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file format: {0} (expected .csv or .parquet)")]
    UnsupportedFormat(String),

    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet: {0}")]
    Parquet(#[from] PolarsError),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("row {row}: timestamp {timestamp} does not follow {previous}")]
    OutOfOrder {
        row: usize,
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },

    #[error("no candles in {0}")]
    Empty(String),
}

impl IngestError {
    fn row(row: usize, message: impl Into<String>) -> Self {
        IngestError::InvalidRow {
            row,
            message: message.into(),
        }
    }
}

/// Load and validate candles from a `.csv` or `.parquet` file.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let candles = match ext.as_deref() {
        Some("csv") => load_csv(path)?,
        Some("parquet") => load_parquet(path)?,
        _ => return Err(IngestError::UnsupportedFormat(path.display().to_string())),
    };
    if candles.is_empty() {
        return Err(IngestError::Empty(path.display().to_string()));
    }
    info!(path = %path.display(), candles = candles.len(), "loaded candles");
    Ok(candles)
}

/// Parse a timestamp in any of the accepted textual formats, or as integer
/// epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return date.and_hms_opt(0, 0, 0);
    }
    raw.parse::<i64>().ok().and_then(from_epoch_millis)
}

fn from_epoch_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

/// BLAKE3 digest over every candle's timestamp and OHLCV values, hex encoded.
pub fn dataset_hash(candles: &[Candle]) -> String {
    let mut hasher = blake3::Hasher::new();
    for c in candles {
        hasher.update(&c.timestamp.and_utc().timestamp_millis().to_le_bytes());
        hasher.update(&c.open.to_le_bytes());
        hasher.update(&c.high.to_le_bytes());
        hasher.update(&c.low.to_le_bytes());
        hasher.update(&c.close.to_le_bytes());
        hasher.update(&c.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Validates rows in order and collects candles.
struct RowValidator {
    candles: Vec<Candle>,
    previous: Option<NaiveDateTime>,
}

impl RowValidator {
    fn with_capacity(n: usize) -> Self {
        Self {
            candles: Vec::with_capacity(n),
            previous: None,
        }
    }

    fn push(&mut self, row: usize, candle: Candle) -> Result<(), IngestError> {
        if !candle.is_sane() {
            return Err(IngestError::row(
                row,
                format!(
                    "inconsistent OHLCV (open {}, high {}, low {}, close {}, volume {})",
                    candle.open, candle.high, candle.low, candle.close, candle.volume
                ),
            ));
        }
        if let Some(previous) = self.previous {
            if candle.timestamp <= previous {
                return Err(IngestError::OutOfOrder {
                    row,
                    timestamp: candle.timestamp,
                    previous,
                });
            }
        }
        self.previous = Some(candle.timestamp);
        self.candles.push(candle);
        Ok(())
    }

    fn finish(self) -> Vec<Candle> {
        self.candles
    }
}

// ── CSV ─────────────────────────────────────────────────────────────

fn load_csv(path: &Path) -> Result<Vec<Candle>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(file)
}

fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<Candle>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let ts_idx = TIMESTAMP_COLUMNS
        .iter()
        .find_map(|name| find(name))
        .ok_or_else(|| IngestError::MissingColumn(TIMESTAMP_COLUMNS.join("|")))?;
    let mut price_idx = [0usize; 5];
    for (slot, name) in price_idx.iter_mut().zip(PRICE_COLUMNS) {
        *slot = find(name).ok_or_else(|| IngestError::MissingColumn(name.to_string()))?;
    }
    debug!(timestamp_column = &headers[ts_idx], "csv header resolved");

    let mut validator = RowValidator::with_capacity(1024);
    for (i, record) in rdr.records().enumerate() {
        let row = i + 1;
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let raw_ts = field(ts_idx);
        let timestamp = parse_timestamp(raw_ts)
            .ok_or_else(|| IngestError::row(row, format!("unparseable timestamp '{raw_ts}'")))?;

        let mut values = [0.0f64; 5];
        for ((value, &idx), name) in values.iter_mut().zip(&price_idx).zip(PRICE_COLUMNS) {
            let raw = field(idx);
            *value = raw
                .parse::<f64>()
                .map_err(|_| IngestError::row(row, format!("{name}: not a number '{raw}'")))?;
        }
        let [open, high, low, close, volume] = values;
        validator.push(row, Candle::new(timestamp, open, high, low, close, volume))?;
    }
    Ok(validator.finish())
}

// ── Parquet ─────────────────────────────────────────────────────────

fn load_parquet(path: &Path) -> Result<Vec<Candle>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let df = ParquetReader::new(file).finish()?;
    dataframe_to_candles(&df)
}

/// Timestamps of a column as parsed values, one per row (`None` = unparseable
/// or null).
fn timestamp_column(col: &Column) -> Result<Vec<Option<NaiveDateTime>>, IngestError> {
    match col.dtype() {
        DataType::String => Ok(col
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_timestamp))
            .collect()),
        DataType::Date | DataType::Datetime(_, _) => {
            let ms = col
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?;
            Ok(ms.i64()?.into_iter().map(|v| v.and_then(from_epoch_millis)).collect())
        }
        dt if dt.is_integer() => {
            let ms = col.cast(&DataType::Int64)?;
            Ok(ms.i64()?.into_iter().map(|v| v.and_then(from_epoch_millis)).collect())
        }
        other => Err(IngestError::row(
            1,
            format!("timestamp column has unsupported type {other}"),
        )),
    }
}

fn dataframe_to_candles(df: &DataFrame) -> Result<Vec<Candle>, IngestError> {
    let ts_name = TIMESTAMP_COLUMNS
        .iter()
        .find(|name| df.column(name).is_ok())
        .ok_or_else(|| IngestError::MissingColumn(TIMESTAMP_COLUMNS.join("|")))?;
    let timestamps = timestamp_column(df.column(ts_name)?)?;

    let mut prices = Vec::with_capacity(PRICE_COLUMNS.len());
    for name in PRICE_COLUMNS {
        let col = df
            .column(name)
            .map_err(|_| IngestError::MissingColumn(name.to_string()))?
            .cast(&DataType::Float64)?;
        prices.push(col);
    }
    let [open, high, low, close, volume] = [
        prices[0].f64()?,
        prices[1].f64()?,
        prices[2].f64()?,
        prices[3].f64()?,
        prices[4].f64()?,
    ];

    let mut validator = RowValidator::with_capacity(df.height());
    for (i, ts) in timestamps.into_iter().enumerate() {
        let row = i + 1;
        let timestamp = ts.ok_or_else(|| IngestError::row(row, "null or unparseable timestamp"))?;
        let value = |ca: &Float64Chunked, name: &str| {
            ca.get(i)
                .ok_or_else(|| IngestError::row(row, format!("{name} is null")))
        };
        let candle = Candle::new(
            timestamp,
            value(open, "open")?,
            value(high, "high")?,
            value(low, "low")?,
            value(close, "close")?,
            value(volume, "volume")?,
        );
        validator.push(row, candle)?;
    }
    Ok(validator.finish())
}
