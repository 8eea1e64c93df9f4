//! CSV-backed market data source
//!
//! Reads per-ticker history files named `<TICKER>.csv` with the columns
//! `date,open,high,low,close,volume`. This stands in for the upstream
//! market data provider; the pipeline only depends on the
//! [`SeriesFetcher`] contract.

use crate::{validate_series, DailyBar, MarketDataError, Result, SeriesFetcher};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Market data source reading one CSV file per ticker from a directory
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    dir: PathBuf,
}

impl CsvBarSource {
    /// Create a source rooted at `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn ticker_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker))
    }
}

impl SeriesFetcher for CsvBarSource {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>> {
        let path = self.ticker_path(ticker);
        if !path.exists() {
            return Err(MarketDataError::NoData {
                ticker: ticker.to_string(),
                start,
                end,
            });
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut bars = Vec::new();
        for row in reader.deserialize::<DailyBar>() {
            let bar = row?;
            if bar.date >= start && bar.date <= end {
                bars.push(bar);
            }
        }

        if bars.is_empty() {
            return Err(MarketDataError::NoData {
                ticker: ticker.to_string(),
                start,
                end,
            });
        }

        bars.sort_by_key(|b| b.date);
        validate_series(&bars)?;
        Ok(bars)
    }
}
