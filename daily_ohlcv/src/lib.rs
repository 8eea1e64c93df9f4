//! # Daily OHLCV
//!
//! `daily_ohlcv` provides the daily OHLCV (Open, High, Low, Close, Volume)
//! bar type used across the workspace, validation of historical series, and
//! the [`SeriesFetcher`] contract through which historical data enters the
//! forecasting pipeline.
//!
//! A fetcher backed by per-ticker CSV files is provided in
//! [`csv_source`]; synthetic random-walk data for tests and demos lives in
//! [`utils`].
//!
//! ## Usage Example
//!
//! ```no_run
//! use daily_ohlcv::{validate_series, SeriesFetcher};
//! use daily_ohlcv::csv_source::CsvBarSource;
//! use chrono::NaiveDate;
//!
//! let source = CsvBarSource::new("data");
//! let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
//!
//! let bars = source.fetch("AAPL", start, end).unwrap();
//! validate_series(&bars).unwrap();
//! println!("fetched {} bars", bars.len());
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod csv_source;
pub mod utils;

pub use csv_source::CsvBarSource;

/// Errors that can occur while acquiring or validating market data
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested range resolved to an empty series. Client-correctable:
    /// the ticker may be unknown or the range may contain no trading days.
    #[error("no data for {ticker} between {start} and {end}")]
    NoData {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// The series violates an ordering invariant
    #[error("invalid series: {0}")]
    InvalidSeries(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, MarketDataError>;

/// One daily bar of price and volume data for a single ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading date of the bar
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: u64,
}

/// Source of historical daily series for a ticker.
///
/// Implementations must return bars in strictly increasing date order and
/// fail with [`MarketDataError::NoData`] rather than returning an empty
/// vector.
pub trait SeriesFetcher {
    /// Fetch the daily bars for `ticker` between `start` and `end` inclusive
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>>;
}

/// Check the ordering invariants of a historical series: dates strictly
/// increasing, no duplicates.
pub fn validate_series(bars: &[DailyBar]) -> Result<()> {
    for pair in bars.windows(2) {
        if pair[1].date == pair[0].date {
            return Err(MarketDataError::InvalidSeries(format!(
                "duplicate date {}",
                pair[0].date
            )));
        }
        if pair[1].date < pair[0].date {
            return Err(MarketDataError::InvalidSeries(format!(
                "dates out of order: {} follows {}",
                pair[1].date, pair[0].date
            )));
        }
    }
    Ok(())
}

/// Extract one price column from a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceColumn {
    Open,
    Close,
}

impl PriceColumn {
    /// Pull this column out of a series as a plain vector
    pub fn values(&self, bars: &[DailyBar]) -> Vec<f64> {
        match self {
            PriceColumn::Open => bars.iter().map(|b| b.open).collect(),
            PriceColumn::Close => bars.iter().map(|b| b.close).collect(),
        }
    }
}

impl std::fmt::Display for PriceColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceColumn::Open => write!(f, "open"),
            PriceColumn::Close => write!(f, "close"),
        }
    }
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
