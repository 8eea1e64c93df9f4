//! Durable storage of the latest prediction per ticker
//!
//! One CSV file per ticker, same layout the original system used:
//! `Ticker,Date,Predicted_Open,Predicted_Close`, one data row. A new
//! prediction for a ticker replaces the previous one; no history is
//! kept. Reads of never-written tickers are a normal not-found, never
//! an error.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

const COLUMNS: [&str; 4] = ["Ticker", "Date", "Predicted_Open", "Predicted_Close"];

/// A stored next-day prediction for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub ticker: String,
    /// The trading date the prediction is for
    pub date: NaiveDate,
    pub predicted_open: Option<f64>,
    pub predicted_close: f64,
}

/// CSV-file-backed prediction store keyed by ticker
#[derive(Debug)]
pub struct CsvPredictionStore {
    dir: PathBuf,
    // Serializes same-store writers so concurrent predictions for one
    // ticker cannot interleave partial writes; last writer wins.
    write_lock: Mutex<()>,
}

impl CsvPredictionStore {
    /// Create a store rooted at `dir`; the directory is created on the
    /// first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn ticker_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("next_day_{}.csv", ticker))
    }

    /// Persist `record`, replacing any previous prediction for the ticker.
    ///
    /// The file is written to a temporary path and renamed into place, so
    /// readers never observe a half-written record.
    pub fn write(&self, record: &PredictionRecord) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::Other, "prediction store lock poisoned")
        })?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.ticker_path(&record.ticker);
        let tmp_path = path.with_extension("csv.tmp");

        let date = record.date.to_string();
        let open = record
            .predicted_open
            .map(|v| v.to_string())
            .unwrap_or_default();
        let close = record.predicted_close.to_string();

        let mut writer = csv::Writer::from_path(&tmp_path)?;
        writer.write_record(COLUMNS)?;
        writer.write_record([record.ticker.as_str(), date.as_str(), open.as_str(), close.as_str()])?;
        writer.flush()?;
        drop(writer);

        std::fs::rename(&tmp_path, &path)?;
        info!(ticker = %record.ticker, path = %path.display(), "prediction saved");
        Ok(())
    }

    /// Fetch the stored prediction for `ticker`, or `None` if none was
    /// ever written. A file with an invalid schema is an error naming the
    /// missing columns, an unparsable date is an error naming the bad
    /// value, and a present-but-empty numeric value reads as 0.
    pub fn read(&self, ticker: &str) -> Result<Option<PredictionRecord>> {
        let path = self.ticker_path(ticker);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        let column_index = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = COLUMNS
            .iter()
            .filter(|name| column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ForecastError::MalformedRecord { missing });
        }

        let row = match reader.records().next() {
            Some(row) => row?,
            None => return Ok(None),
        };
        let field = |name: &str| row.get(column_index(name).unwrap()).unwrap_or("");

        let date: NaiveDate = field("Date").parse().map_err(|_| {
            ForecastError::InvalidValue {
                column: "Date".to_string(),
                value: field("Date").to_string(),
            }
        })?;
        let predicted_open = {
            let raw = field("Predicted_Open");
            if raw.is_empty() {
                None
            } else {
                Some(raw.parse::<f64>().unwrap_or(0.0))
            }
        };
        let predicted_close = field("Predicted_Close").parse::<f64>().unwrap_or(0.0);

        Ok(Some(PredictionRecord {
            ticker: field("Ticker").to_string(),
            date,
            predicted_open,
            predicted_close,
        }))
    }
}
